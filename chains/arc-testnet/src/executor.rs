use crate::registry::WalletIdentity;
use crate::task::{OperationCatalog, OperationRequest};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{with_retry, ExecutionError, RetryConfig};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// What a successful receipt wait yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Confirmed {
        block_number: Option<u64>,
        gas_used: Option<U256>,
    },
    Failed {
        block_number: Option<u64>,
    },
    NotFound,
}

/// One resolved connection to the RPC endpoint.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    async fn balance(&self, address: Address) -> Result<U256>;

    async fn pending_nonce(&self, address: Address) -> Result<U256>;

    /// Fills, signs and sends `tx`. Returns once the node accepted it.
    async fn broadcast(&self, signer: &LocalWallet, tx: TypedTransaction) -> Result<TxHash>;

    /// Waits for inclusion. Dropped, reverted and timed-out transactions are errors.
    async fn wait_for_receipt(&self, hash: TxHash, timeout: Option<Duration>) -> Result<Confirmation>;

    async fn transaction_status(&self, hash: TxHash) -> Result<TxStatus>;
}

/// Produces connections for wallets.
pub trait Connector: Send + Sync {
    type Conn: ChainConnection;

    fn connect(&self, wallet: &WalletIdentity) -> Result<Self::Conn>;
    fn connect_direct(&self) -> Result<Self::Conn>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Confirmed,
    Rejected,
    BroadcastFailed,
    ConfirmationFailed,
    Skipped,
}

/// Normalized result of one execution. `tx_hash` is set whenever the call
/// was broadcast, `error` whenever `success` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub status: OutcomeStatus,
    pub success: bool,
    pub tx_hash: Option<TxHash>,
    pub gas_used: Option<U256>,
    pub block_number: Option<u64>,
    pub error: Option<String>,
}

impl OperationOutcome {
    pub fn confirmed(confirmation: Confirmation) -> Self {
        Self {
            status: OutcomeStatus::Confirmed,
            success: true,
            tx_hash: Some(confirmation.tx_hash),
            gas_used: confirmation.gas_used,
            block_number: confirmation.block_number,
            error: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::failed(OutcomeStatus::Rejected, None, reason)
    }

    pub fn broadcast_failed(reason: impl Into<String>) -> Self {
        Self::failed(OutcomeStatus::BroadcastFailed, None, reason)
    }

    pub fn confirmation_failed(hash: TxHash, reason: impl Into<String>) -> Self {
        Self::failed(OutcomeStatus::ConfirmationFailed, Some(hash), reason)
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::failed(OutcomeStatus::Skipped, None, reason)
    }

    fn failed(status: OutcomeStatus, tx_hash: Option<TxHash>, reason: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            tx_hash,
            gas_used: None,
            block_number: None,
            error: Some(reason.into()),
        }
    }
}

/// Validate, resolve, pin the nonce, broadcast under retry, then wait for the
/// receipt once. Every broadcast attempt reuses the pinned nonce.
pub struct TransactionExecutor<C: Connector> {
    connector: C,
    catalog: OperationCatalog,
    retry: RetryConfig,
    confirmation_timeout: Option<Duration>,
}

impl<C: Connector> TransactionExecutor<C> {
    pub fn new(connector: C, catalog: OperationCatalog, retry: RetryConfig) -> Self {
        Self {
            connector,
            catalog,
            retry,
            confirmation_timeout: None,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub async fn execute(
        &self,
        wallet: &WalletIdentity,
        request: &OperationRequest,
        label: &str,
    ) -> OperationOutcome {
        let mut tx = match self.catalog.build(request) {
            Ok(tx) => tx,
            Err(e) => {
                warn!("[{}] {} rejected: {}", wallet.name(), label, e);
                return OperationOutcome::rejected(ExecutionError::from(e).to_string());
            }
        };

        let conn = match self.connector.connect(wallet) {
            Ok(conn) => conn,
            Err(e) => {
                let err = ExecutionError::Resolution {
                    wallet: wallet.name().to_string(),
                    reason: format!("{:#}", e),
                };
                return OperationOutcome::broadcast_failed(err.to_string());
            }
        };

        let conn_ref = &conn;
        let signer = wallet.signer();
        let retry_label = format!("[{}] {}", wallet.name(), label);

        let address = wallet.address();
        let nonce = with_retry(self.retry, &format!("{} nonce", retry_label), || async move {
            conn_ref.pending_nonce(address).await
        })
        .await;
        match nonce {
            Ok(nonce) => {
                tx.set_nonce(nonce);
            }
            Err(e) => {
                let err = ExecutionError::Broadcast {
                    attempts: self.retry.attempts(),
                    reason: format!("{}", e.root_cause()),
                };
                return OperationOutcome::broadcast_failed(err.to_string());
            }
        }

        let broadcast = with_retry(self.retry, &retry_label, || {
            let tx = tx.clone();
            async move { conn_ref.broadcast(signer, tx).await }
        })
        .await;

        let hash = match broadcast {
            Ok(hash) => hash,
            Err(e) => {
                let err = ExecutionError::Broadcast {
                    attempts: self.retry.attempts(),
                    reason: format!("{}", e.root_cause()),
                };
                return OperationOutcome::broadcast_failed(err.to_string());
            }
        };

        info!("[{}] {} sent: {:?}", wallet.name(), label, hash);

        match conn.wait_for_receipt(hash, self.confirmation_timeout).await {
            Ok(confirmation) => OperationOutcome::confirmed(confirmation),
            Err(e) => {
                let err = ExecutionError::Confirmation {
                    tx_hash: format!("{:?}", hash),
                    reason: format!("{:#}", e),
                };
                OperationOutcome::confirmation_failed(hash, err.to_string())
            }
        }
    }

    pub async fn balance(&self, wallet: &WalletIdentity) -> Result<U256> {
        let conn = self.connector.connect(wallet)?;
        conn.balance(wallet.address()).await
    }

    pub async fn lookup_status(&self, hash: TxHash) -> Result<TxStatus> {
        let conn = self.connector.connect_direct()?;
        conn.transaction_status(hash).await
    }
}
