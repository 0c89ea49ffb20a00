//! Formatos JSON-RPC e conversão para os tipos da Sentinela

use ethereum_types::{Address, H256, U256, U64};
use sentinela_core::{
    BlockInfo, CallRequest, ReceiptInfo, SignedAuthorization, TransactionInfo,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use web3::types::Bytes;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcAuthorization {
    pub chain_id: U256,
    pub address: Address,
    pub nonce: U64,
    #[serde(alias = "v")]
    pub y_parity: U64,
    pub r: U256,
    pub s: U256,
}

impl From<RpcAuthorization> for SignedAuthorization {
    fn from(auth: RpcAuthorization) -> Self {
        Self {
            chain_id: auth.chain_id.low_u64(),
            address: auth.address,
            nonce: auth.nonce.as_u64(),
            y_parity: auth.y_parity.low_u64() as u8,
            r: auth.r,
            s: auth.s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcTransaction {
    pub hash: H256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub nonce: U256,
    #[serde(rename = "type")]
    pub tx_type: Option<U64>,
    pub gas_price: Option<U256>,
    pub block_number: Option<U64>,
    #[serde(default)]
    pub authorization_list: Vec<RpcAuthorization>,
}

impl From<RpcTransaction> for TransactionInfo {
    fn from(tx: RpcTransaction) -> Self {
        Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            input: tx.input.0,
            nonce: tx.nonce.low_u64(),
            tx_type: tx.tx_type.map(|t| t.as_u64()),
            gas_price: tx.gas_price,
            block_number: tx.block_number.map(|b| b.as_u64()),
            authorization_list: tx.authorization_list.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcReceipt {
    pub transaction_hash: H256,
    pub status: Option<U64>,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
    pub effective_gas_price: Option<U256>,
}

impl From<RpcReceipt> for ReceiptInfo {
    fn from(receipt: RpcReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            status: receipt.status.map(|s| s.as_u64()),
            block_number: receipt.block_number.map(|b| b.as_u64()),
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcBlock {
    pub number: Option<U64>,
    pub hash: Option<H256>,
    pub timestamp: U256,
    pub base_fee_per_gas: Option<U256>,
}

impl RpcBlock {
    pub fn into_info(self, requested: u64) -> BlockInfo {
        BlockInfo {
            number: self.number.map(|n| n.as_u64()).unwrap_or(requested),
            hash: self.hash,
            timestamp: self.timestamp.low_u64(),
            base_fee_per_gas: self.base_fee_per_gas,
        }
    }
}

/// Quantidade hexadecimal sem zeros à esquerda
pub(crate) fn quantity(value: u64) -> Value {
    Value::String(format!("0x{:x}", value))
}

pub(crate) fn u256_quantity(value: &U256) -> Value {
    Value::String(format!("0x{:x}", value))
}

pub(crate) fn address_value(address: &Address) -> Value {
    Value::String(format!("0x{:x}", address))
}

pub(crate) fn bytes_value(data: &[u8]) -> Value {
    Value::String(format!("0x{}", hex::encode(data)))
}

/// Objeto de chamada usado por `eth_call` e `eth_estimateGas`
pub(crate) fn call_object(request: &CallRequest) -> Value {
    let mut obj = Map::new();
    if let Some(from) = &request.from {
        obj.insert("from".into(), address_value(from));
    }
    if let Some(to) = &request.to {
        obj.insert("to".into(), address_value(to));
    }
    if let Some(value) = &request.value {
        obj.insert("value".into(), u256_quantity(value));
    }
    if !request.data.is_empty() {
        obj.insert("data".into(), bytes_value(&request.data));
    }
    if let Some(gas) = &request.gas {
        obj.insert("gas".into(), u256_quantity(gas));
    }
    if let Some(fee) = &request.max_fee_per_gas {
        obj.insert("maxFeePerGas".into(), u256_quantity(fee));
    }
    if let Some(tip) = &request.max_priority_fee_per_gas {
        obj.insert("maxPriorityFeePerGas".into(), u256_quantity(tip));
    }
    if !request.authorization_list.is_empty() {
        obj.insert("type".into(), quantity(4));
        let list = request
            .authorization_list
            .iter()
            .map(|auth| {
                json!({
                    "chainId": quantity(auth.chain_id),
                    "address": address_value(&auth.address),
                    "nonce": quantity(auth.nonce),
                    "yParity": quantity(auth.y_parity as u64),
                    "r": u256_quantity(&auth.r),
                    "s": u256_quantity(&auth.s),
                })
            })
            .collect();
        obj.insert("authorizationList".into(), Value::Array(list));
    }
    Value::Object(obj)
}
