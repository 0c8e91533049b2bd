#![allow(dead_code)]

use anyhow::{anyhow, Result};
use arc_testnet::executor::{ChainConnection, Confirmation, Connector, TxStatus};
use arc_testnet::task::{ContractSet, OperationCatalog};
use arc_testnet::WalletIdentity;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const KEYS: [&str; 3] = [
    "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
    "8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f",
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
];

pub fn wallets(n: usize) -> Vec<WalletIdentity> {
    KEYS.iter()
        .take(n)
        .enumerate()
        .map(|(i, key)| {
            WalletIdentity::new(
                key.parse::<LocalWallet>().unwrap(),
                format!("Wallet-{}", i + 1),
                None,
            )
        })
        .collect()
}

pub fn catalog() -> OperationCatalog {
    OperationCatalog::new(ContractSet {
        nft_contract: Some(Address::repeat_byte(0x11)),
        name_registry: Some(Address::repeat_byte(0x22)),
        token_bytecode: Some(Bytes::from(vec![0x60, 0x80])),
    })
}

#[derive(Default)]
pub struct MockState {
    pub balances: Mutex<HashMap<Address, U256>>,
    pub failing_balance: Mutex<Vec<Address>>,
    pub connects: AtomicUsize,
    pub balance_queries: AtomicUsize,
    pub nonce_queries: AtomicUsize,
    /// Nonce carried by each broadcast attempt, in order
    pub nonces: Mutex<Vec<Option<U256>>>,
    pub broadcasts: AtomicUsize,
    pub broadcasters: Mutex<Vec<Address>>,
    pub receipt_waits: AtomicUsize,
    /// Broadcasts that fail before the first one succeeds
    pub failing_broadcasts: AtomicUsize,
    pub refuse_connections: AtomicBool,
    pub drop_receipts: AtomicBool,
}

/// In-memory chain: every connection shares one state.
#[derive(Clone, Default)]
pub struct MockChain {
    pub state: Arc<MockState>,
}

impl MockChain {
    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.state.balances.lock().unwrap().insert(address, balance);
        self
    }

    pub fn failing_balance_for(self, address: Address) -> Self {
        self.state.failing_balance.lock().unwrap().push(address);
        self
    }

    pub fn failing_broadcasts(self, n: usize) -> Self {
        self.state.failing_broadcasts.store(n, Ordering::SeqCst);
        self
    }

    pub fn dropping_receipts(self) -> Self {
        self.state.drop_receipts.store(true, Ordering::SeqCst);
        self
    }

    pub fn refusing_connections(self) -> Self {
        self.state.refuse_connections.store(true, Ordering::SeqCst);
        self
    }

    pub fn broadcasts(&self) -> usize {
        self.state.broadcasts.load(Ordering::SeqCst)
    }

    pub fn nonces(&self) -> Vec<Option<U256>> {
        self.state.nonces.lock().unwrap().clone()
    }

    pub fn broadcasts_from(&self, address: Address) -> usize {
        self.state
            .broadcasters
            .lock()
            .unwrap()
            .iter()
            .filter(|a| **a == address)
            .count()
    }
}

impl Connector for MockChain {
    type Conn = MockChain;

    fn connect(&self, _wallet: &WalletIdentity) -> Result<Self::Conn> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(anyhow!("proxy unreachable"));
        }
        Ok(self.clone())
    }

    fn connect_direct(&self) -> Result<Self::Conn> {
        Ok(self.clone())
    }
}

#[async_trait]
impl ChainConnection for MockChain {
    async fn balance(&self, address: Address) -> Result<U256> {
        self.state.balance_queries.fetch_add(1, Ordering::SeqCst);
        if self.state.failing_balance.lock().unwrap().contains(&address) {
            return Err(anyhow!("rpc timeout"));
        }
        Ok(self
            .state
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn pending_nonce(&self, _address: Address) -> Result<U256> {
        // Each query sees a later pending count, as a node would while
        // earlier attempts sit in the mempool.
        let n = self.state.nonce_queries.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(40 + n))
    }

    async fn broadcast(&self, signer: &LocalWallet, tx: TypedTransaction) -> Result<TxHash> {
        let n = self.state.broadcasts.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.broadcasters.lock().unwrap().push(signer.address());
        self.state.nonces.lock().unwrap().push(tx.nonce().copied());

        let remaining = self.state.failing_broadcasts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.state
                .failing_broadcasts
                .store(remaining - 1, Ordering::SeqCst);
            return Err(anyhow!("nonce too low (attempt {})", n));
        }
        Ok(H256::from_low_u64_be(n as u64))
    }

    async fn wait_for_receipt(&self, hash: TxHash, _timeout: Option<Duration>) -> Result<Confirmation> {
        self.state.receipt_waits.fetch_add(1, Ordering::SeqCst);
        if self.state.drop_receipts.load(Ordering::SeqCst) {
            return Err(anyhow!("transaction dropped"));
        }
        Ok(Confirmation {
            tx_hash: hash,
            block_number: Some(100),
            gas_used: Some(U256::from(21_000)),
        })
    }

    async fn transaction_status(&self, _hash: TxHash) -> Result<TxStatus> {
        Ok(TxStatus::Pending)
    }
}
