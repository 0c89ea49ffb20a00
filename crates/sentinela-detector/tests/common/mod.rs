#![allow(dead_code)]

use async_trait::async_trait;
use ethereum_types::{Address, U256};
use parking_lot::Mutex;
use sentinela_core::{
    error::{Error, Result},
    traits::{AlertSink, ChainDataAccessor},
    BlockInfo, FeeData, ReceiptInfo, ThreatAlert, TransactionHash, TransactionInfo,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub const MALICIOUS_TARGET: &str = "ee224caafbc78cc9a208bd22f8e7362b76eef4fa";

pub fn ether(n: u64) -> U256 {
    U256::exp10(18) * n
}

pub fn delegation_code(target: Address) -> Vec<u8> {
    let mut code = vec![0xef, 0x01, 0x00];
    code.extend_from_slice(target.as_bytes());
    code
}

pub fn malicious_target() -> Address {
    MALICIOUS_TARGET.parse().unwrap()
}

#[derive(Clone, Default)]
pub struct Account {
    pub code: Vec<u8>,
    pub balance: U256,
    pub nonce: u64,
}

/// Chain em memória com contadores de chamadas
#[derive(Default)]
pub struct MockChain {
    pub accounts: Mutex<HashMap<Address, Account>>,
    pub transactions: Mutex<HashMap<TransactionHash, TransactionInfo>>,
    pub receipts: Mutex<HashMap<TransactionHash, ReceiptInfo>>,
    pub blocks: Mutex<HashMap<u64, BlockInfo>>,
    pub block_number: AtomicU64,
    pub fail_reads: Mutex<bool>,
    pub fail_block_number: Mutex<bool>,
    /// Falhas pontuais por tipo de leitura
    pub fail_code: Mutex<bool>,
    pub fail_blocks: Mutex<bool>,
    pub fail_chain_id: Mutex<bool>,
    pub reads: AtomicUsize,
    pub code_reads: AtomicUsize,
}

impl MockChain {
    pub fn with_account(self, address: Address, account: Account) -> Self {
        self.accounts.lock().insert(address, account);
        self
    }

    pub fn set_account(&self, address: Address, account: Account) {
        self.accounts.lock().insert(address, account);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock() = fail;
    }

    fn account(&self, address: Address) -> Result<Account> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_reads.lock() {
            return Err(Error::Rpc("connection refused".into()));
        }
        Ok(self.accounts.lock().get(&address).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ChainDataAccessor for MockChain {
    async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        self.code_reads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_code.lock() {
            return Err(Error::Rpc("code read timeout".into()));
        }
        Ok(self.account(address)?.code)
    }
    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.account(address)?.balance)
    }
    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        Ok(self.account(address)?.nonce)
    }
    async fn get_chain_id(&self) -> Result<u64> {
        if *self.fail_reads.lock() || *self.fail_chain_id.lock() {
            return Err(Error::Rpc("connection refused".into()));
        }
        Ok(10143)
    }
    async fn get_fee_data(&self) -> Result<FeeData> {
        Ok(FeeData::default())
    }
    async fn get_block_number(&self) -> Result<u64> {
        if *self.fail_block_number.lock() {
            return Err(Error::Rpc("timeout".into()));
        }
        Ok(self.block_number.load(Ordering::SeqCst))
    }
    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<TransactionInfo>> {
        if *self.fail_reads.lock() {
            return Err(Error::Rpc("connection refused".into()));
        }
        Ok(self.transactions.lock().get(&tx_hash).cloned())
    }
    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Option<ReceiptInfo>> {
        Ok(self.receipts.lock().get(&tx_hash).cloned())
    }
    async fn get_block(&self, block_number: u64) -> Result<Option<BlockInfo>> {
        if *self.fail_blocks.lock() {
            return Err(Error::Rpc("block read timeout".into()));
        }
        Ok(self.blocks.lock().get(&block_number).cloned())
    }
}

/// Sink que guarda tudo o que recebe
#[derive(Default)]
pub struct RecordingSink {
    pub alerts: Mutex<Vec<ThreatAlert>>,
    pub scans: AtomicUsize,
    pub active: Mutex<Vec<usize>>,
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn publish(&self, alert: ThreatAlert) -> Result<()> {
        self.alerts.lock().push(alert);
        Ok(())
    }

    async fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::SeqCst);
    }

    async fn set_active_monitoring(&self, count: usize) {
        self.active.lock().push(count);
    }
}
