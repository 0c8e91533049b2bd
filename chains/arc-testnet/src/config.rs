use anyhow::{Context, Result};
use config::{Config, File};
use core_logic::{ConfigError, RetryConfig, ValidationError};
use ethers::types::{Address, Bytes, U256};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::task::validate;
use crate::task::ContractSet;

pub const RPC_URL_ENV: &str = "ARC_RPC_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct ArcConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    #[serde(default)]
    pub nft_contract: Option<String>,
    #[serde(default)]
    pub name_registry: Option<String>,
    #[serde(default)]
    pub token_bytecode_file: Option<String>,
    #[serde(default = "default_min_balance")]
    pub min_balance: f64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_wallet_delay_ms")]
    pub wallet_delay_ms: u64,
    #[serde(default = "default_operation_delay_ms")]
    pub operation_delay_ms: u64,
    #[serde(default)]
    pub confirmation_timeout_secs: Option<u64>,
    #[serde(default = "default_wallets_file")]
    pub wallets_file: String,
    #[serde(default = "default_proxies_file")]
    pub proxies_file: String,
    #[serde(default = "default_faucet_url")]
    pub faucet_url: String,
}

fn default_min_balance() -> f64 {
    0.01
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_wallet_delay_ms() -> u64 {
    3000
}

fn default_operation_delay_ms() -> u64 {
    5000
}

fn default_wallets_file() -> String {
    core_logic::WalletManager::WALLET_FILE.to_string()
}

fn default_proxies_file() -> String {
    core_logic::ProxyManager::PROXY_FILE.to_string()
}

fn default_faucet_url() -> String {
    "https://faucet.circle.com".to_string()
}

impl ArcConfig {
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        let mut config: ArcConfig = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;

        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Using RPC URL from {}", RPC_URL_ENV);
                config.rpc_url = url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.rpc_url).map_err(|_| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
        })?;

        if self.chain_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chain_id".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }

        if !self.min_balance.is_finite() || self.min_balance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_balance".to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }

        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retry_attempts, self.retry_delay_ms)
    }

    pub fn min_balance_wei(&self) -> Result<U256, ValidationError> {
        validate::to_base_units("min_balance", self.min_balance)
    }

    pub fn wallet_delay(&self) -> Duration {
        Duration::from_millis(self.wallet_delay_ms)
    }

    pub fn operation_delay(&self) -> Duration {
        Duration::from_millis(self.operation_delay_ms)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }

    /// Parses contract addresses and reads the deployment bytecode.
    /// Entries left unset stay `None`; the catalog rejects operations needing them.
    pub fn contracts(&self) -> Result<ContractSet> {
        let nft_contract = parse_contract("nft_contract", self.nft_contract.as_deref())?;
        let name_registry = parse_contract("name_registry", self.name_registry.as_deref())?;

        let token_bytecode = match self.token_bytecode_file.as_deref() {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read bytecode from {}", path))?;
                let trimmed = raw.trim();
                let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
                let bytes = hex::decode(hex_part)
                    .with_context(|| format!("Bytecode in {} is not valid hex", path))?;
                Some(Bytes::from(bytes))
            }
            None => None,
        };

        Ok(ContractSet {
            nft_contract,
            name_registry,
            token_bytecode,
        })
    }
}

fn parse_contract(field: &str, value: Option<&str>) -> Result<Option<Address>, ConfigError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => validate::address(raw)
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: field.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_apply() {
        let file = write_config("rpc_url = \"https://rpc.example\"\nchain_id = 5042002\n");
        let settings = Config::builder()
            .add_source(File::from(file.path()))
            .build()
            .unwrap();
        let config: ArcConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 5000);
        assert_eq!(config.wallet_delay_ms, 3000);
        assert_eq!(config.min_balance, 0.01);
        assert!(config.confirmation_timeout().is_none());
        assert_eq!(config.wallets_file, "wallets.txt");
        assert_eq!(config.min_balance_wei().unwrap(), U256::exp10(16));
    }

    #[test]
    fn test_bad_rpc_url_rejected() {
        let file = write_config("rpc_url = \"not a url\"\nchain_id = 1\n");
        let path = file.path().to_string_lossy().to_string();
        assert!(ArcConfig::load(&path).is_err());
    }

    #[test]
    fn test_contracts_parse_and_bytecode_loads() {
        let mut bytecode = tempfile::NamedTempFile::new().unwrap();
        bytecode.write_all(b"0x6080604052\n").unwrap();

        let file = write_config(&format!(
            "rpc_url = \"https://rpc.example\"\nchain_id = 1\n\
             nft_contract = \"0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed\"\n\
             token_bytecode_file = \"{}\"\n",
            bytecode.path().display().to_string().replace('\\', "/")
        ));
        let settings = Config::builder()
            .add_source(File::from(file.path()))
            .build()
            .unwrap();
        let config: ArcConfig = settings.try_deserialize().unwrap();
        let contracts = config.contracts().unwrap();

        assert!(contracts.nft_contract.is_some());
        assert!(contracts.name_registry.is_none());
        assert_eq!(
            contracts.token_bytecode.unwrap().to_vec(),
            vec![0x60, 0x80, 0x60, 0x40, 0x52]
        );
    }
}
