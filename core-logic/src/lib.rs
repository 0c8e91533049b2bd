//! # Core Logic - Shared Utilities for the Arc Testnet Bot
//!
//! Chain-agnostic building blocks used by the chain crates: wallet and proxy
//! sources, fixed-delay retry, session counters and logging.
//!
//! ## Modules
//!
//! - [`config`] - Proxy descriptors
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Batch counters and JSON export
//! - [`utils`] - Utility modules (wallet file, proxy rotation, retry, logger)

pub mod config;
pub mod error;
pub mod metrics;
pub(crate) mod utils;

pub use config::ProxyDescriptor;
pub use error::{ConfigError, ExecutionError, NetworkError, ValidationError, WalletError};
pub use metrics::{BatchCounters, CountersSnapshot, OperationKind};

pub use utils::{setup_logger, ProxyManager, ProxyRotation, WalletManager, WalletRecord};

pub use utils::retry::{with_retry, RetryConfig, RetryContext};
