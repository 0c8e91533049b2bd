pub mod batch;
pub mod config;
pub mod executor;
pub mod registry;
pub mod task;
pub mod utils;

pub use batch::{BatchOperation, BatchReport, BatchRunner, WalletReport, WalletState};
pub use config::ArcConfig;
pub use executor::{OperationOutcome, OutcomeStatus, TransactionExecutor};
pub use registry::{WalletIdentity, WalletRegistry};
pub use task::{OperationCatalog, OperationRequest};
pub use utils::EndpointProvider;
