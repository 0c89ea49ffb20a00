//! Transação tipo 0x04 (set-code) da EIP-7702

use ethereum_types::{Address, H256, U256};
use ethers::signers::LocalWallet;
use rlp::RlpStream;
use sentinela_core::{utils::keccak256, CallRequest, SignedAuthorization, SET_CODE_TX_TYPE};

use crate::authorization::y_parity;
use crate::errors::{RemediationError, Result};

/// Transação set-code ainda não assinada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCodeTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas_limit: U256,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub authorization_list: Vec<SignedAuthorization>,
}

impl SetCodeTransaction {
    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.chain_id);
        stream.append(&self.nonce);
        stream.append(&self.max_priority_fee_per_gas);
        stream.append(&self.max_fee_per_gas);
        stream.append(&self.gas_limit);
        stream.append(&self.to);
        stream.append(&self.value);
        stream.append(&self.data);
        // access list vazia
        stream.begin_list(0);
        stream.begin_list(self.authorization_list.len());
        for auth in &self.authorization_list {
            stream.begin_list(6);
            stream.append(&auth.chain_id);
            stream.append(&auth.address);
            stream.append(&auth.nonce);
            stream.append(&auth.y_parity);
            stream.append(&auth.r);
            stream.append(&auth.s);
        }
    }

    /// Hash assinado pelo remetente
    pub fn signing_hash(&self) -> H256 {
        let mut stream = RlpStream::new_list(10);
        self.append_fields(&mut stream);
        H256::from(keccak256(&typed_payload(&stream.out())))
    }

    /// Assina e serializa no formato aceito por `eth_sendRawTransaction`
    pub fn sign(&self, wallet: &LocalWallet) -> Result<Vec<u8>> {
        let signature = wallet
            .sign_hash(self.signing_hash())
            .map_err(|e| RemediationError::Signing(e.to_string()))?;

        let mut stream = RlpStream::new_list(13);
        self.append_fields(&mut stream);
        stream.append(&y_parity(signature.v));
        stream.append(&signature.r);
        stream.append(&signature.s);
        Ok(typed_payload(&stream.out()))
    }

    /// Requisição equivalente para `eth_call` e `eth_estimateGas`
    pub fn to_call_request(&self, from: Address) -> CallRequest {
        CallRequest {
            from: Some(from),
            to: Some(self.to),
            value: Some(self.value),
            data: self.data.clone(),
            gas: Some(self.gas_limit),
            max_fee_per_gas: Some(self.max_fee_per_gas),
            max_priority_fee_per_gas: Some(self.max_priority_fee_per_gas),
            authorization_list: self.authorization_list.clone(),
        }
    }
}

/// Hash de uma transação serializada
pub fn raw_transaction_hash(raw: &[u8]) -> H256 {
    H256::from(keccak256(raw))
}

fn typed_payload(rlp: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rlp.len() + 1);
    out.push(SET_CODE_TX_TYPE);
    out.extend_from_slice(rlp);
    out
}
