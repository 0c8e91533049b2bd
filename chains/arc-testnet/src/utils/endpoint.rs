use crate::executor::{ChainConnection, Confirmation, Connector, TxStatus};
use crate::registry::{assign_proxy, ProxyChoice, WalletIdentity};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{NetworkError, ProxyDescriptor, ProxyRotation};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Builds one JSON-RPC handle per resolution, bound to the configured URL
/// and chain id, routed through the wallet's proxy when there is one.
#[derive(Debug, Clone)]
pub struct EndpointProvider {
    rpc_url: Url,
    chain_id: u64,
    proxies: Arc<ProxyRotation>,
}

impl EndpointProvider {
    pub fn new(rpc_url: &str, chain_id: u64, proxies: Arc<ProxyRotation>) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url).with_context(|| format!("Invalid RPC URL {}", rpc_url))?;
        Ok(Self {
            rpc_url,
            chain_id,
            proxies,
        })
    }

    pub fn resolve(&self, wallet: &WalletIdentity) -> Result<EthersConnection> {
        let choice = assign_proxy(wallet, &self.proxies);
        let route = match &choice {
            ProxyChoice::Fixed(p) => format!("fixed proxy {}", p),
            ProxyChoice::Pooled(p) => format!("pooled proxy {}", p),
            ProxyChoice::Direct => "direct".to_string(),
        };
        debug!("[{}] connecting via {}", wallet.name(), route);

        let client = build_client(choice.descriptor(), wallet.name())?;
        Ok(self.connection_with(client, choice))
    }

    /// Unproxied handle, for lookups that are not tied to a wallet.
    pub fn direct(&self) -> Result<EthersConnection> {
        let client = Client::builder().build()?;
        Ok(self.connection_with(client, ProxyChoice::Direct))
    }

    fn connection_with(&self, client: Client, route: ProxyChoice) -> EthersConnection {
        let provider = Provider::new(Http::new_with_client(self.rpc_url.clone(), client));
        EthersConnection {
            provider,
            chain_id: self.chain_id,
            endpoint: self.rpc_url.host_str().unwrap_or_default().to_string(),
            route,
        }
    }
}

impl Connector for EndpointProvider {
    type Conn = EthersConnection;

    fn connect(&self, wallet: &WalletIdentity) -> Result<Self::Conn> {
        self.resolve(wallet)
    }

    fn connect_direct(&self) -> Result<Self::Conn> {
        self.direct()
    }
}

/// A proxy that reqwest refuses degrades to a direct client with a warning.
fn build_client(proxy: Option<&ProxyDescriptor>, wallet: &str) -> Result<Client> {
    let mut builder = Client::builder();

    if let Some(proxy_conf) = proxy {
        match reqwest::Proxy::all(proxy_conf.url()) {
            Ok(mut proxy) => {
                if let Some((u, p)) = proxy_conf.credentials() {
                    proxy = proxy.basic_auth(u, p);
                }
                builder = builder.proxy(proxy);
            }
            Err(e) => {
                warn!(
                    "[{}] proxy {} rejected ({}); connecting directly",
                    wallet, proxy_conf, e
                );
            }
        }
    }

    builder.build().context("Failed to build HTTP client")
}

/// `ethers` implementation of [`ChainConnection`].
#[derive(Debug, Clone)]
pub struct EthersConnection {
    provider: Provider<Http>,
    chain_id: u64,
    endpoint: String,
    route: ProxyChoice,
}

impl EthersConnection {
    pub fn route(&self) -> &ProxyChoice {
        &self.route
    }
}

#[async_trait]
impl ChainConnection for EthersConnection {
    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address, None)
            .await
            .context("Failed to fetch balance")
    }

    async fn pending_nonce(&self, address: Address) -> Result<U256> {
        self.provider
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .context("Failed to fetch nonce")
    }

    async fn broadcast(&self, signer: &LocalWallet, mut tx: TypedTransaction) -> Result<TxHash> {
        let from = signer.address();
        tx.set_from(from);
        tx.set_chain_id(self.chain_id);

        if tx.nonce().is_none() {
            let nonce = self.pending_nonce(from).await?;
            tx.set_nonce(nonce);
        }

        self.provider
            .fill_transaction(&mut tx, None)
            .await
            .context("Failed to estimate fees/gas")?;

        let signature = signer
            .sign_transaction(&tx)
            .await
            .context("Failed to sign transaction")?;

        let pending = self
            .provider
            .send_raw_transaction(tx.rlp_signed(&signature))
            .await
            .context("Failed to send transaction")?;

        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash, timeout: Option<Duration>) -> Result<Confirmation> {
        let pending = PendingTransaction::new(hash, &self.provider);

        let receipt = match timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                NetworkError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                    endpoint: self.endpoint.clone(),
                }
            })?,
            None => pending.await,
        }
        .context("Receipt polling failed")?;

        let receipt = receipt.ok_or_else(|| NetworkError::TransactionDropped {
            tx_hash: format!("{:?}", hash),
        })?;

        let block_number = receipt.block_number.map(|b| b.as_u64());
        if receipt.status != Some(U64::from(1)) {
            return Err(NetworkError::TransactionReverted {
                tx_hash: format!("{:?}", hash),
                block: block_number
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            }
            .into());
        }

        Ok(Confirmation {
            tx_hash: hash,
            block_number,
            gas_used: receipt.gas_used,
        })
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<TxStatus> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .context("Failed to fetch receipt")?;

        if let Some(receipt) = receipt {
            let block_number = receipt.block_number.map(|b| b.as_u64());
            return Ok(if receipt.status == Some(U64::from(1)) {
                TxStatus::Confirmed {
                    block_number,
                    gas_used: receipt.gas_used,
                }
            } else {
                TxStatus::Failed { block_number }
            });
        }

        let known = self
            .provider
            .get_transaction(hash)
            .await
            .context("Failed to fetch transaction")?;

        Ok(match known {
            Some(_) => TxStatus::Pending,
            None => TxStatus::NotFound,
        })
    }
}
