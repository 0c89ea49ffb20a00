#![allow(dead_code)]

use async_trait::async_trait;
use ethereum_types::{Address, U256};
use ethers::signers::{LocalWallet, Signer};
use parking_lot::Mutex;
use sentinela_remediation::raw_transaction_hash;
use sentinela_core::{
    config::RemediationConfig,
    error::{Error, Result},
    traits::{ChainDataAccessor, TransactionSubmitter},
    utils::gwei,
    BlockInfo, CallRequest, FeeData, ReceiptInfo, TransactionHash, TransactionInfo,
};

pub const OWNER_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const SAFE_ADDRESS: &str = "0x2222222222222222222222222222222222222222";

pub fn owner() -> LocalWallet {
    OWNER_KEY.parse().unwrap()
}

pub fn ether(n: u64) -> U256 {
    U256::exp10(18) * n
}

pub fn delegation_code(target: Address) -> Vec<u8> {
    let mut code = vec![0xef, 0x01, 0x00];
    code.extend_from_slice(target.as_bytes());
    code
}

/// Config com polling curto para os testes
pub fn fast_config() -> RemediationConfig {
    RemediationConfig {
        receipt_poll_interval_ms: 5,
        receipt_timeout_ms: 50,
        ..RemediationConfig::default()
    }
}

/// Estado mutável do node simulado
pub struct NodeState {
    pub code: Vec<u8>,
    pub balance: U256,
    pub nonce: u64,
    pub chain_id: u64,
    pub fees: FeeData,
    /// Status do recibo devolvido após um envio; `None` nunca inclui
    pub receipt_status: Option<u64>,
    pub fail_reads: bool,
    pub fail_call: bool,
    pub fail_estimate: bool,
    pub fail_send: bool,
    pub calls: Vec<CallRequest>,
    pub estimates: Vec<CallRequest>,
    pub sent: Vec<Vec<u8>>,
    pub receipt_lookups: usize,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            code: Vec::new(),
            balance: U256::zero(),
            nonce: 0,
            chain_id: 10143,
            fees: FeeData {
                gas_price: Some(gwei(10)),
                max_fee_per_gas: Some(gwei(50)),
                max_priority_fee_per_gas: Some(gwei(2)),
            },
            receipt_status: Some(1),
            fail_reads: false,
            fail_call: false,
            fail_estimate: false,
            fail_send: false,
            calls: Vec::new(),
            estimates: Vec::new(),
            sent: Vec::new(),
            receipt_lookups: 0,
        }
    }
}

/// Node em memória que registra chamadas e transações enviadas.
///
/// Um cancelamento confirmado limpa o código da conta.
#[derive(Default)]
pub struct MockNode {
    pub state: Mutex<NodeState>,
}

impl MockNode {
    pub fn new(state: NodeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.clone()
    }

    fn read<T>(&self, f: impl FnOnce(&NodeState) -> T) -> Result<T> {
        let state = self.state.lock();
        if state.fail_reads {
            return Err(Error::Rpc("connection refused".into()));
        }
        Ok(f(&state))
    }
}

#[async_trait]
impl ChainDataAccessor for MockNode {
    async fn get_code(&self, _address: Address) -> Result<Vec<u8>> {
        self.read(|s| s.code.clone())
    }
    async fn get_balance(&self, _address: Address) -> Result<U256> {
        self.read(|s| s.balance)
    }
    async fn get_transaction_count(&self, _address: Address) -> Result<u64> {
        self.read(|s| s.nonce)
    }
    async fn get_chain_id(&self) -> Result<u64> {
        self.read(|s| s.chain_id)
    }
    async fn get_fee_data(&self) -> Result<FeeData> {
        self.read(|s| s.fees.clone())
    }
    async fn get_block_number(&self) -> Result<u64> {
        Ok(1)
    }
    async fn get_transaction(&self, _tx_hash: TransactionHash) -> Result<Option<TransactionInfo>> {
        Ok(None)
    }
    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Option<ReceiptInfo>> {
        let mut state = self.state.lock();
        state.receipt_lookups += 1;
        let known = state.sent.iter().any(|raw| raw_transaction_hash(raw) == tx_hash);
        Ok(state.receipt_status.filter(|_| known).map(|status| ReceiptInfo {
            transaction_hash: tx_hash,
            status: Some(status),
            block_number: Some(2),
            gas_used: Some(U256::from(46_000u64)),
            effective_gas_price: Some(gwei(25)),
        }))
    }
    async fn get_block(&self, _block_number: u64) -> Result<Option<BlockInfo>> {
        Ok(None)
    }
}

#[async_trait]
impl TransactionSubmitter for MockNode {
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        state.calls.push(request.clone());
        if state.fail_call {
            return Err(Error::Rpc("execution reverted".into()));
        }
        Ok(Vec::new())
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<U256> {
        let mut state = self.state.lock();
        state.estimates.push(request.clone());
        if state.fail_estimate {
            return Err(Error::Rpc("gas required exceeds allowance".into()));
        }
        Ok(U256::from(21_000u64))
    }

    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TransactionHash> {
        let mut state = self.state.lock();
        if state.fail_send {
            return Err(Error::Rpc("nonce too low".into()));
        }
        let hash = raw_transaction_hash(&raw);
        if raw.first() == Some(&0x04) && state.receipt_status == Some(1) {
            state.code.clear();
        }
        state.sent.push(raw);
        Ok(hash)
    }
}

pub fn owner_address() -> Address {
    owner().address()
}
