//! Sequential, balance-gated iteration over the wallet pool.

use crate::executor::{Connector, OperationOutcome, OutcomeStatus, TransactionExecutor};
use crate::registry::WalletIdentity;
use crate::task::random::{random_name, random_token_config};
use crate::task::OperationRequest;
use core_logic::{BatchCounters, ExecutionError, OperationKind};
use ethers::prelude::*;
use ethers::utils::format_ether;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-wallet progress. Terminal states are `Skipped`, `Confirmed`,
/// `Rejected`, `BroadcastFailed` and `ConfirmationFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState {
    Pending,
    BalanceChecked,
    Skipped,
    Submitting,
    Confirmed,
    Rejected,
    BroadcastFailed,
    ConfirmationFailed,
}

impl WalletState {
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            WalletState::Pending | WalletState::BalanceChecked | WalletState::Submitting
        )
    }

    fn from_outcome(outcome: &OperationOutcome) -> Self {
        match outcome.status {
            OutcomeStatus::Confirmed => WalletState::Confirmed,
            OutcomeStatus::Rejected => WalletState::Rejected,
            OutcomeStatus::BroadcastFailed => WalletState::BroadcastFailed,
            OutcomeStatus::ConfirmationFailed => WalletState::ConfirmationFailed,
            OutcomeStatus::Skipped => WalletState::Skipped,
        }
    }
}

impl fmt::Display for WalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WalletState::Pending => "PENDING",
            WalletState::BalanceChecked => "BALANCE_CHECKED",
            WalletState::Skipped => "SKIPPED",
            WalletState::Submitting => "SUBMITTING",
            WalletState::Confirmed => "CONFIRMED",
            WalletState::Rejected => "REJECTED",
            WalletState::BroadcastFailed => "BROADCAST_FAILED",
            WalletState::ConfirmationFailed => "CONFIRMATION_FAILED",
        };
        f.write_str(s)
    }
}

fn transition(wallet: &WalletIdentity, state: &mut WalletState, next: WalletState) {
    debug!("[{}] {} -> {}", wallet.name(), state, next);
    *state = next;
}

/// What to run on each wallet of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOperation {
    /// Same request for every wallet.
    Fixed(OperationRequest),
    /// Fresh random token parameters per wallet.
    RandomToken,
    /// Name `i` for wallet `i`; wallets past the end of the list get a random name.
    Names(Vec<String>),
    RandomName,
}

impl BatchOperation {
    pub fn request_for(&self, index: usize) -> OperationRequest {
        let mut rng = rand::thread_rng();
        match self {
            BatchOperation::Fixed(request) => request.clone(),
            BatchOperation::RandomToken => {
                let token = random_token_config(&mut rng, index);
                OperationRequest::deploy_token(token.name, token.symbol, token.supply)
            }
            BatchOperation::Names(names) => match names.get(index) {
                Some(name) => OperationRequest::register_name(name.clone()),
                None => OperationRequest::register_name(random_name(&mut rng)),
            },
            BatchOperation::RandomName => OperationRequest::register_name(random_name(&mut rng)),
        }
    }
}

/// One operation attempt (or skip) on one wallet.
#[derive(Debug, Clone)]
pub struct WalletReport {
    pub wallet: String,
    pub address: Address,
    pub balance: Option<U256>,
    pub operation: Option<String>,
    pub kind: Option<OperationKind>,
    pub units: u64,
    pub state: WalletState,
    pub outcome: OperationOutcome,
}

impl WalletReport {
    fn fold_into(&self, counters: &mut BatchCounters) {
        match self.kind {
            Some(kind) if self.state != WalletState::Skipped => {
                counters.record_execution(kind, self.outcome.success, self.units)
            }
            _ => counters.record_skip(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub wallets: Vec<WalletReport>,
    /// Counters for this batch alone; the session counters are updated in place.
    pub counters: BatchCounters,
}

impl BatchReport {
    /// Folds a finished wallet into both this batch and the session counters.
    fn push(&mut self, entry: WalletReport, session: &mut BatchCounters) {
        entry.fold_into(&mut self.counters);
        entry.fold_into(session);
        self.wallets.push(entry);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceEntry {
    pub wallet: String,
    pub address: Address,
    pub balance: U256,
    pub formatted: String,
    pub sufficient: bool,
}

pub struct BatchRunner<C: Connector> {
    executor: TransactionExecutor<C>,
    wallet_delay: Duration,
    operation_delay: Duration,
}

impl<C: Connector> BatchRunner<C> {
    pub fn new(executor: TransactionExecutor<C>) -> Self {
        Self {
            executor,
            wallet_delay: Duration::from_secs(3),
            operation_delay: Duration::from_secs(5),
        }
    }

    pub fn with_delays(mut self, wallet_delay: Duration, operation_delay: Duration) -> Self {
        self.wallet_delay = wallet_delay;
        self.operation_delay = operation_delay;
        self
    }

    pub fn executor(&self) -> &TransactionExecutor<C> {
        &self.executor
    }

    /// Runs `operation` on every wallet in order. Wallets below `min_balance`
    /// (or whose balance cannot be read) are skipped without touching the
    /// executor. Each wallet is folded into `counters` as soon as it finishes.
    pub async fn run_batch(
        &self,
        wallets: &[WalletIdentity],
        min_balance: U256,
        operation: &BatchOperation,
        counters: &mut BatchCounters,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        info!("Starting batch over {} wallet(s)", wallets.len());

        for (index, wallet) in wallets.iter().enumerate() {
            let mut state = WalletState::Pending;

            let balance = match self.gate(wallet, &mut state, min_balance).await {
                Ok(balance) => balance,
                Err(skipped) => {
                    report.push(skipped, counters);
                    self.pace(index, wallets.len()).await;
                    continue;
                }
            };

            let request = operation.request_for(index);
            let entry = self.submit(wallet, &mut state, Some(balance), &request).await;
            report.push(entry, counters);
            self.pace(index, wallets.len()).await;
        }

        report
    }

    /// Balance-checks every wallet, then for each funded one mints an NFT,
    /// deploys a random token and registers a random name, pausing between
    /// steps and between wallets.
    pub async fn run_auto_all(
        &self,
        wallets: &[WalletIdentity],
        min_balance: U256,
        counters: &mut BatchCounters,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut funded = Vec::new();

        for wallet in wallets {
            let mut state = WalletState::Pending;
            match self.gate(wallet, &mut state, min_balance).await {
                Ok(balance) => funded.push((wallet, balance)),
                Err(skipped) => report.push(skipped, counters),
            }
        }

        info!(
            "Auto-all: {} of {} wallet(s) funded",
            funded.len(),
            wallets.len()
        );

        for (index, (wallet, balance)) in funded.iter().enumerate() {
            let steps = [
                BatchOperation::Fixed(OperationRequest::mint(1)),
                BatchOperation::RandomToken,
                BatchOperation::RandomName,
            ];

            for (step, operation) in steps.iter().enumerate() {
                let mut state = WalletState::BalanceChecked;
                let request = operation.request_for(index);
                let entry = self.submit(wallet, &mut state, Some(*balance), &request).await;
                report.push(entry, counters);

                if step + 1 < steps.len() {
                    tokio::time::sleep(self.operation_delay).await;
                }
            }

            self.pace(index, funded.len()).await;
        }

        report
    }

    /// Balances for every wallet. A failed query reports zero and insufficient.
    pub async fn balance_report(
        &self,
        wallets: &[WalletIdentity],
        min_balance: U256,
    ) -> Vec<BalanceEntry> {
        let mut entries = Vec::with_capacity(wallets.len());

        for wallet in wallets {
            let (balance, queried) = match self.executor.balance(wallet).await {
                Ok(balance) => (balance, true),
                Err(e) => {
                    warn!("[{}] balance query failed: {:#}", wallet.name(), e);
                    (U256::zero(), false)
                }
            };

            entries.push(BalanceEntry {
                wallet: wallet.name().to_string(),
                address: wallet.address(),
                balance,
                formatted: format_ether(balance),
                sufficient: queried && balance >= min_balance,
            });
        }

        entries
    }

    async fn gate(
        &self,
        wallet: &WalletIdentity,
        state: &mut WalletState,
        min_balance: U256,
    ) -> Result<U256, WalletReport> {
        let balance = match self.executor.balance(wallet).await {
            Ok(balance) => balance,
            Err(e) => {
                transition(wallet, state, WalletState::Skipped);
                let reason = format!("balance query failed: {:#}", e);
                return Err(skip_report(wallet, None, reason));
            }
        };
        transition(wallet, state, WalletState::BalanceChecked);

        if balance < min_balance {
            transition(wallet, state, WalletState::Skipped);
            let err = ExecutionError::InsufficientBalance {
                balance: format_ether(balance),
                required: format_ether(min_balance),
            };
            return Err(skip_report(wallet, Some(balance), err.to_string()));
        }

        Ok(balance)
    }

    async fn submit(
        &self,
        wallet: &WalletIdentity,
        state: &mut WalletState,
        balance: Option<U256>,
        request: &OperationRequest,
    ) -> WalletReport {
        transition(wallet, state, WalletState::Submitting);
        let label = request.name().to_string();

        let outcome = self.executor.execute(wallet, request, &label).await;
        transition(wallet, state, WalletState::from_outcome(&outcome));
        log_result(wallet, &label, *state, &outcome);

        WalletReport {
            wallet: wallet.name().to_string(),
            address: wallet.address(),
            balance,
            operation: Some(label),
            kind: Some(request.kind()),
            units: request.units(),
            state: *state,
            outcome,
        }
    }

    async fn pace(&self, index: usize, total: usize) {
        if index + 1 < total && !self.wallet_delay.is_zero() {
            tokio::time::sleep(self.wallet_delay).await;
        }
    }
}

/// Wallets below `min_balance`, for the faucet guide.
pub fn faucet_candidates(entries: &[BalanceEntry]) -> Vec<&BalanceEntry> {
    entries.iter().filter(|e| !e.sufficient).collect()
}

fn skip_report(wallet: &WalletIdentity, balance: Option<U256>, reason: String) -> WalletReport {
    info!(target: "task_result", "[{}] SKIPPED {}", wallet.name(), reason);
    WalletReport {
        wallet: wallet.name().to_string(),
        address: wallet.address(),
        balance,
        operation: None,
        kind: None,
        units: 0,
        state: WalletState::Skipped,
        outcome: OperationOutcome::skipped(reason),
    }
}

fn log_result(wallet: &WalletIdentity, label: &str, state: WalletState, outcome: &OperationOutcome) {
    let hash = outcome
        .tx_hash
        .map(|h| format!("{:?}", h))
        .unwrap_or_else(|| "-".to_string());

    if outcome.success {
        info!(
            target: "task_result",
            "[{}] CONFIRMED {} tx={} block={} gas={}",
            wallet.name(),
            label,
            hash,
            outcome.block_number.map(|b| b.to_string()).unwrap_or_default(),
            outcome.gas_used.map(|g| g.to_string()).unwrap_or_default()
        );
    } else {
        info!(
            target: "task_result",
            "[{}] FAILED {} ({}) tx={} {}",
            wallet.name(),
            label,
            state,
            hash,
            outcome.error.as_deref().unwrap_or_default()
        );
    }
}
