use ethereum_types::{Address, H256, U256};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{transaction::eip2718::TypedTransaction, Eip1559TransactionRequest};
use sentinela_core::{
    config::RemediationConfig,
    error::Result as CoreResult,
    traits::TransactionSubmitter,
    utils::{format_ether, parse_address, to_checksum},
    CallRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{RemediationError, Result};
use crate::submission::{submit_and_wait, GasSettings, SubmissionStage};

/// Opções da transferência de emergência
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Valor exato em wei; ausente transfere tudo menos a reserva de gás
    pub amount: Option<U256>,
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    /// Apenas estima o gás
    pub dry_run: bool,
}

/// Resultado final de uma transferência
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub success: bool,
    pub transaction_hash: Option<H256>,
    /// Valor em wei
    pub amount_transferred: Option<U256>,
    pub error: Option<String>,
    pub gas_used: Option<U256>,
    pub stage: SubmissionStage,
}

impl TransferResult {
    fn not_submitted(error: RemediationError) -> Self {
        Self {
            success: false,
            transaction_hash: None,
            amount_transferred: None,
            error: Some(error.to_string()),
            gas_used: None,
            stage: SubmissionStage::NotSubmitted,
        }
    }
}

/// Custo estimado de uma transferência simples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCost {
    pub gas_limit: U256,
    pub gas_price: U256,
    pub total_cost: U256,
}

/// Carteira nova para receber os fundos resgatados
#[derive(Debug, Clone)]
pub struct RescueWallet {
    pub address: Address,
    /// Chave privada em hex com prefixo `0x`
    pub private_key: String,
}

/// Transferência calculada, pronta para simular ou assinar
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedTransfer {
    owner: Address,
    destination: Address,
    amount: U256,
    nonce: u64,
    chain_id: u64,
    gas: GasSettings,
}

impl PlannedTransfer {
    fn call_request(&self) -> CallRequest {
        CallRequest {
            from: Some(self.owner),
            to: Some(self.destination),
            value: Some(self.amount),
            gas: Some(self.gas.gas_limit),
            max_fee_per_gas: Some(self.gas.max_fee_per_gas),
            max_priority_fee_per_gas: Some(self.gas.max_priority_fee_per_gas),
            ..Default::default()
        }
    }

    fn typed_transaction(&self) -> TypedTransaction {
        Eip1559TransactionRequest::new()
            .from(self.owner)
            .to(self.destination)
            .value(self.amount)
            .gas(self.gas.gas_limit)
            .max_fee_per_gas(self.gas.max_fee_per_gas)
            .max_priority_fee_per_gas(self.gas.max_priority_fee_per_gas)
            .nonce(self.nonce)
            .chain_id(self.chain_id)
            .into()
    }
}

/// Move os fundos de uma carteira comprometida para um endereço seguro
pub struct EmergencyTransfer<S> {
    submitter: Arc<S>,
    config: RemediationConfig,
}

impl<S: TransactionSubmitter> EmergencyTransfer<S> {
    pub fn new(submitter: Arc<S>, config: RemediationConfig) -> Self {
        Self { submitter, config }
    }

    /// Transfere os fundos. Nunca retorna erro; falhas vêm no resultado.
    ///
    /// Destino inválido é rejeitado antes de qualquer chamada remota.
    pub async fn move_to_safety(
        &self,
        wallet: &LocalWallet,
        destination: &str,
        options: &TransferOptions,
    ) -> TransferResult {
        let owner = wallet.address();
        let destination = match validate_destination(destination, owner) {
            Ok(destination) => destination,
            Err(e) => return TransferResult::not_submitted(e),
        };
        info!(from = ?owner, to = ?destination, dry_run = options.dry_run, "iniciando transferência de emergência");

        let plan = match self.plan(owner, destination, options).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(address = ?owner, error = %e, "transferência recusada");
                return TransferResult::not_submitted(e);
            }
        };

        if options.dry_run {
            let error = match self.submitter.estimate_gas(&plan.call_request()).await {
                Ok(_) => None,
                Err(e) => Some(RemediationError::Simulation(e.to_string()).to_string()),
            };
            return TransferResult {
                success: error.is_none(),
                transaction_hash: None,
                amount_transferred: error.is_none().then_some(plan.amount),
                error,
                gas_used: None,
                stage: SubmissionStage::Simulated,
            };
        }

        let raw = match sign_transfer(wallet, &plan) {
            Ok(raw) => raw,
            Err(e) => return TransferResult::not_submitted(e),
        };

        let submitted = submit_and_wait(self.submitter.as_ref(), raw, &self.config).await;
        let success = submitted.stage == SubmissionStage::Confirmed;
        TransferResult {
            success,
            transaction_hash: submitted.transaction_hash,
            amount_transferred: success.then_some(plan.amount),
            error: submitted.error,
            gas_used: submitted.receipt.and_then(|r| r.gas_used),
            stage: submitted.stage,
        }
    }

    async fn plan(
        &self,
        owner: Address,
        destination: Address,
        options: &TransferOptions,
    ) -> Result<PlannedTransfer> {
        let (balance, nonce, chain_id, fees) = futures::try_join!(
            self.submitter.get_balance(owner),
            self.submitter.get_transaction_count(owner),
            self.submitter.get_chain_id(),
            self.submitter.get_fee_data(),
        )?;

        if balance.is_zero() {
            return Err(RemediationError::NoFunds);
        }

        let gas = GasSettings::resolve(
            options.gas_limit,
            options.max_fee_per_gas,
            options.max_priority_fee_per_gas,
            self.config.transfer_gas_limit,
            &fees,
            &self.config,
        );
        let reserve = gas.max_cost();
        if balance <= reserve {
            return Err(RemediationError::InsufficientGas {
                balance: format_ether(&balance),
                required: format_ether(&reserve),
            });
        }

        let amount = match options.amount {
            Some(amount) => {
                let required = amount.saturating_add(reserve);
                if balance < required {
                    return Err(RemediationError::InsufficientBalance {
                        required: format_ether(&required),
                        amount: format_ether(&amount),
                        balance: format_ether(&balance),
                    });
                }
                amount
            }
            None => balance - reserve,
        };

        Ok(PlannedTransfer {
            owner,
            destination,
            amount,
            nonce,
            chain_id,
            gas,
        })
    }

    /// Custo de uma transferência simples com a taxa atual da rede
    pub async fn estimate_transfer_cost(&self) -> CoreResult<TransferCost> {
        let fees = self.submitter.get_fee_data().await?;
        let gas_limit = U256::from(self.config.transfer_gas_limit);
        let gas_price = fees
            .max_fee_per_gas
            .unwrap_or(self.config.fallback_max_fee_per_gas);
        Ok(TransferCost {
            gas_limit,
            gas_price,
            total_cost: gas_limit.saturating_mul(gas_price),
        })
    }
}

/// Gera uma carteira aleatória para receber os fundos
pub fn generate_rescue_wallet() -> RescueWallet {
    let wallet = LocalWallet::new(&mut ethers::core::rand::thread_rng());
    RescueWallet {
        address: wallet.address(),
        private_key: format!("0x{}", hex::encode(wallet.signer().to_bytes())),
    }
}

fn validate_destination(destination: &str, owner: Address) -> Result<Address> {
    let address = parse_address(destination)
        .map_err(|e| RemediationError::InvalidDestination(e.to_string()))?;
    if address.is_zero() {
        return Err(RemediationError::InvalidDestination(
            "refusing to send funds to the zero address".to_string(),
        ));
    }
    if address == owner {
        return Err(RemediationError::InvalidDestination(format!(
            "destination {} is the compromised wallet itself",
            to_checksum(&address)
        )));
    }
    Ok(address)
}

fn sign_transfer(wallet: &LocalWallet, plan: &PlannedTransfer) -> Result<Vec<u8>> {
    let tx = plan.typed_transaction();
    let signature = wallet
        .sign_transaction_sync(&tx)
        .map_err(|e| RemediationError::Signing(e.to_string()))?;
    Ok(tx.rlp_signed(&signature).to_vec())
}
