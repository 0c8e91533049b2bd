use anyhow::Result;
use core_logic::{
    ProxyDescriptor, ProxyManager, ProxyRotation, WalletError, WalletManager, WalletRecord,
};
use ethers::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A loaded wallet: signer, display name and the raw fixed-proxy string from
/// its wallet line, if any. The key never leaves the signer.
pub struct WalletIdentity {
    signer: LocalWallet,
    name: String,
    fixed_proxy: Option<String>,
}

impl WalletIdentity {
    pub fn new(signer: LocalWallet, name: impl Into<String>, fixed_proxy: Option<String>) -> Self {
        Self {
            signer,
            name: name.into(),
            fixed_proxy,
        }
    }

    fn from_record(record: &WalletRecord, chain_id: u64) -> Result<Self> {
        let signer = record.private_key.parse::<LocalWallet>()?.with_chain_id(chain_id);
        Ok(Self::new(signer, record.name.clone(), record.proxy.clone()))
    }

    pub fn signer(&self) -> &LocalWallet {
        &self.signer
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn fixed_proxy(&self) -> Option<&str> {
        self.fixed_proxy.as_deref()
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("name", &self.name)
            .field("address", &self.address())
            .field("fixed_proxy", &self.fixed_proxy.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Where a wallet's traffic goes for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyChoice {
    Fixed(ProxyDescriptor),
    Pooled(ProxyDescriptor),
    Direct,
}

impl ProxyChoice {
    pub fn descriptor(&self) -> Option<&ProxyDescriptor> {
        match self {
            ProxyChoice::Fixed(p) | ProxyChoice::Pooled(p) => Some(p),
            ProxyChoice::Direct => None,
        }
    }
}

/// Fixed proxy first, then the next pool entry, then a direct connection.
/// An unparseable fixed proxy degrades to direct and leaves the pool cursor
/// untouched.
pub fn assign_proxy(wallet: &WalletIdentity, rotation: &ProxyRotation) -> ProxyChoice {
    if let Some(raw) = wallet.fixed_proxy() {
        return match ProxyDescriptor::parse(raw) {
            Ok(proxy) => ProxyChoice::Fixed(proxy),
            Err(e) => {
                warn!("[{}] {}; connecting directly", wallet.name(), e);
                ProxyChoice::Direct
            }
        };
    }

    match rotation.next_proxy() {
        Some(proxy) => ProxyChoice::Pooled(proxy.clone()),
        None => ProxyChoice::Direct,
    }
}

/// Owns every wallet identity for the process lifetime, plus the shared
/// proxy pool.
#[derive(Debug)]
pub struct WalletRegistry {
    wallets: Vec<WalletIdentity>,
    proxies: Arc<ProxyRotation>,
}

impl WalletRegistry {
    pub fn load(wallets_file: &str, proxies_file: &str, chain_id: u64) -> Result<Self> {
        let records = WalletManager::load(wallets_file)?;
        let proxies = ProxyManager::load_proxies(proxies_file)?;
        Self::from_records(&records, proxies, chain_id, wallets_file)
    }

    pub fn from_records(
        records: &[WalletRecord],
        proxies: Vec<ProxyDescriptor>,
        chain_id: u64,
        source: &str,
    ) -> Result<Self> {
        let wallets: Vec<WalletIdentity> = records
            .iter()
            .filter_map(|record| match WalletIdentity::from_record(record, chain_id) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    error!("Dropping wallet on line {} ({}): {}", record.line, record.name, e);
                    None
                }
            })
            .collect();

        if wallets.is_empty() {
            return Err(WalletError::NoValidWallets {
                path: source.to_string(),
            }
            .into());
        }

        let proxies = ProxyRotation::new(proxies);
        info!(
            "Registry ready: {} wallet(s), {} pooled proxies",
            wallets.len(),
            proxies.len()
        );

        Ok(Self {
            wallets,
            proxies: Arc::new(proxies),
        })
    }

    pub fn wallets(&self) -> &[WalletIdentity] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn proxies(&self) -> Arc<ProxyRotation> {
        Arc::clone(&self.proxies)
    }
}
