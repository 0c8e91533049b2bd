//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate and the chain
//! crates built on it. All errors implement `std::error::Error` and
//! `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid proxy '{proxy}': {reason}")]
    InvalidProxy { proxy: String, reason: String },
}

/// Wallet source and key material errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Wallet file not found: {path}")]
    SourceMissing { path: String },

    #[error("No valid wallets found in {path}")]
    NoValidWallets { path: String },

    #[error("Invalid private key on line {line}: {reason}")]
    InvalidKey { line: usize, reason: String },

    #[error("Private key too short: expected 64 hex chars, got {length}")]
    InvalidKeyLength { length: usize },
}

/// Network and RPC-related errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("RPC request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("Transaction {tx_hash} was dropped before inclusion")]
    TransactionDropped { tx_hash: String },

    #[error("Transaction {tx_hash} reverted in block {block}")]
    TransactionReverted { tx_hash: String, block: String },
}

/// Input rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name must be at least 3 characters long (got {length})")]
    NameTooShort { length: usize },

    #[error("Name must be at most 20 characters long (got {length})")]
    NameTooLong { length: usize },

    #[error("Name '{name}' can only contain lowercase letters, numbers, and hyphens")]
    NameCharacters { name: String },

    #[error("Name '{name}' cannot start or end with a hyphen")]
    NameHyphenEdge { name: String },

    #[error("Token name must be 2-30 characters long (got {length})")]
    TokenNameLength { length: usize },

    #[error("Token symbol must be 2-10 characters long (got {length})")]
    SymbolLength { length: usize },

    #[error("Token symbol '{symbol}' can only contain letters and numbers")]
    SymbolCharacters { symbol: String },

    #[error("Invalid address '{address}'")]
    InvalidAddress { address: String },

    #[error("Address '{address}' fails checksum validation")]
    ChecksumMismatch { address: String },

    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    #[error("Contract '{field}' is not configured")]
    MissingContract { field: String },
}

/// Failure taxonomy of one transaction execution
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not resolve a connection for {wallet}: {reason}")]
    Resolution { wallet: String, reason: String },

    #[error("Broadcast failed after {attempts} attempt(s): {reason}")]
    Broadcast { attempts: u32, reason: String },

    #[error("Transaction {tx_hash} was broadcast but not confirmed: {reason}")]
    Confirmation { tx_hash: String, reason: String },

    #[error("Insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: String, required: String },
}
