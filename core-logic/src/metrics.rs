//! Session counters for batch runs.
//!
//! [`BatchCounters`] is a plain value owned by the caller and passed by
//! `&mut` into each batch; nothing here is global.

use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

/// Which kind of operation a confirmed transaction performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Mint,
    DeployToken,
    RegisterName,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchCounters {
    /// Wallets that reached the executor (skipped wallets excluded).
    pub total_attempted: u64,
    pub succeeded: u64,
    /// Failed executions plus skipped wallets.
    pub failed: u64,
    pub skipped: u64,
    pub nfts_minted: u64,
    pub tokens_deployed: u64,
    pub names_registered: u64,
    pub transfers: u64,
}

impl BatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one executed operation into the counters.
    pub fn record_execution(&mut self, kind: OperationKind, success: bool, units: u64) {
        self.total_attempted += 1;
        if !success {
            self.failed += 1;
            return;
        }
        self.succeeded += 1;
        match kind {
            OperationKind::Mint => self.nfts_minted += units,
            OperationKind::DeployToken => self.tokens_deployed += 1,
            OperationKind::RegisterName => self.names_registered += 1,
            OperationKind::Transfer => self.transfers += 1,
        }
    }

    /// A wallet gated out before execution.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
        self.failed += 1;
    }

    /// Success rate over executed operations, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total_attempted as f64 * 100.0
        }
    }

    pub fn snapshot(&self, started: Instant) -> CountersSnapshot {
        CountersSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            runtime_secs: started.elapsed().as_secs(),
            success_rate: self.success_rate(),
            counters: self.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountersSnapshot {
    pub timestamp: String,
    pub runtime_secs: u64,
    pub success_rate: f64,
    pub counters: BatchCounters,
}

impl CountersSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        tokio::fs::write(path, self.to_json()).await
    }
}
