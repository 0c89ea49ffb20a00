//! Autorizações EIP-7702
//!
//! A mensagem assinada é `keccak256(0x05 || rlp([chain_id, address, nonce]))`.
//! Autorizar o endereço zero limpa a delegação da conta.

use ethereum_types::{Address, H256};
use ethers::signers::LocalWallet;
use ethers::types::Signature;
use rlp::RlpStream;
use sentinela_core::{utils::keccak256, SignedAuthorization};

use crate::errors::{RemediationError, Result};

/// Discriminador das mensagens de autorização
pub const AUTHORIZATION_MAGIC: u8 = 0x05;

/// Hash assinado por uma autorização
pub fn authorization_hash(chain_id: u64, address: &Address, nonce: u64) -> H256 {
    let mut stream = RlpStream::new_list(3);
    stream.append(&chain_id);
    stream.append(address);
    stream.append(&nonce);

    let mut payload = vec![AUTHORIZATION_MAGIC];
    payload.extend_from_slice(&stream.out());
    H256::from(keccak256(&payload))
}

/// Assina uma autorização com a chave do dono da conta
pub fn sign_authorization(
    wallet: &LocalWallet,
    chain_id: u64,
    address: Address,
    nonce: u64,
) -> Result<SignedAuthorization> {
    let hash = authorization_hash(chain_id, &address, nonce);
    let signature = wallet
        .sign_hash(hash)
        .map_err(|e| RemediationError::Signing(e.to_string()))?;

    Ok(SignedAuthorization {
        chain_id,
        address,
        nonce,
        y_parity: y_parity(signature.v),
        r: signature.r,
        s: signature.s,
    })
}

/// Recupera o endereço que assinou a autorização
pub fn recover_authority(authorization: &SignedAuthorization) -> Result<Address> {
    let hash = authorization_hash(
        authorization.chain_id,
        &authorization.address,
        authorization.nonce,
    );
    let signature = Signature {
        r: authorization.r,
        s: authorization.s,
        v: authorization.y_parity as u64 + 27,
    };
    signature
        .recover(hash)
        .map_err(|e| RemediationError::Signing(e.to_string()))
}

/// Converte `v` (27/28 ou 0/1) em paridade
pub(crate) fn y_parity(v: u64) -> u8 {
    let recid = if v >= 27 { v - 27 } else { v };
    (recid % 2) as u8
}
