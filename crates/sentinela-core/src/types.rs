/*!
 * Sentinela Types
 *
 * Tipos comuns usados em toda a workspace Sentinela
 */

use ethereum_types::{Address, H256, U256};
use futures::try_join;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::traits::ChainDataAccessor;

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Chain id da testnet Monad
pub const MONAD_TESTNET_CHAIN_ID: u64 = 10143;

/// Tipo de transação EIP-7702 (set code)
pub const SET_CODE_TX_TYPE: u8 = 0x04;

/// Severidade atribuída pelo classificador de risco
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Leitura única do estado de uma conta.
///
/// As quatro leituras são feitas em paralelo e podem refletir blocos
/// ligeiramente diferentes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub code: Vec<u8>,
    pub balance: U256,
    pub nonce: u64,
    pub chain_id: u64,
}

impl AccountSnapshot {
    /// Captura código, saldo, nonce e chain id de uma conta
    pub async fn capture<C>(accessor: &C, address: Address) -> Result<Self>
    where
        C: ChainDataAccessor + ?Sized,
    {
        let (code, balance, nonce, chain_id) = try_join!(
            accessor.get_code(address),
            accessor.get_balance(address),
            accessor.get_transaction_count(address),
            accessor.get_chain_id(),
        )?;

        Ok(Self {
            address,
            code,
            balance,
            nonce,
            chain_id,
        })
    }

    /// Captura só código, saldo e nonce; o chain id vem de quem chama
    pub async fn capture_state<C>(accessor: &C, address: Address, chain_id: u64) -> Result<Self>
    where
        C: ChainDataAccessor + ?Sized,
    {
        let (code, balance, nonce) = try_join!(
            accessor.get_code(address),
            accessor.get_balance(address),
            accessor.get_transaction_count(address),
        )?;

        Ok(Self {
            address,
            code,
            balance,
            nonce,
            chain_id,
        })
    }

    /// Hash Keccak-256 do código da conta
    pub fn code_hash(&self) -> H256 {
        H256(crate::utils::keccak256(&self.code))
    }
}

/// Estimativa de taxas da rede. Campos ausentes quando o node não os expõe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeData {
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Tupla de autorização EIP-7702 assinada
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    pub chain_id: u64,
    pub address: Address,
    pub nonce: u64,
    pub y_parity: u8,
    pub r: U256,
    pub s: U256,
}

/// Requisição usada em `eth_call` e `eth_estimateGas`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub data: Vec<u8>,
    pub gas: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub authorization_list: Vec<SignedAuthorization>,
}

/// Transação obtida do node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub hash: TransactionHash,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Vec<u8>,
    pub nonce: u64,
    pub tx_type: Option<u64>,
    pub gas_price: Option<U256>,
    pub block_number: Option<u64>,
    pub authorization_list: Vec<SignedAuthorization>,
}

impl TransactionInfo {
    /// Indica se é uma transação set-code (tipo 0x04)
    pub fn is_set_code(&self) -> bool {
        self.tx_type == Some(SET_CODE_TX_TYPE as u64)
    }
}

/// Recibo de transação
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptInfo {
    pub transaction_hash: TransactionHash,
    pub status: Option<u64>,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
    pub effective_gas_price: Option<U256>,
}

impl ReceiptInfo {
    pub fn succeeded(&self) -> bool {
        self.status == Some(1)
    }
}

/// Cabeçalho resumido de bloco
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub number: u64,
    pub hash: Option<H256>,
    pub timestamp: u64,
    pub base_fee_per_gas: Option<U256>,
}
