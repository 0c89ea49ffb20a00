use ethereum_types::{Address, H256, U256};
use ethers::signers::{LocalWallet, Signer};
use sentinela_core::{
    config::RemediationConfig,
    traits::TransactionSubmitter,
    utils::encode_hex,
};
use sentinela_detector::detect;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::authorization::sign_authorization;
use crate::errors::{RemediationError, Result};
use crate::set_code_tx::SetCodeTransaction;
use crate::submission::{submit_and_wait, GasSettings, SubmissionStage};

pub const REASON_NO_DELEGATION: &str = "No active delegation found";
pub const REASON_INSUFFICIENT_GAS: &str = "Insufficient balance for gas fees";

/// Opções de cancelamento. Campos ausentes usam a estimativa da rede.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellationOptions {
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    /// Apenas simula via `eth_call`
    pub dry_run: bool,
}

/// Resultado final de um cancelamento
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationResult {
    pub success: bool,
    pub transaction_hash: Option<H256>,
    pub error: Option<String>,
    pub gas_used: Option<U256>,
    pub effective_gas_price: Option<U256>,
    pub stage: SubmissionStage,
}

impl CancellationResult {
    fn not_submitted(error: RemediationError) -> Self {
        Self {
            success: false,
            transaction_hash: None,
            error: Some(error.to_string()),
            gas_used: None,
            effective_gas_price: None,
            stage: SubmissionStage::NotSubmitted,
        }
    }
}

/// Elegibilidade para cancelar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEligibility {
    pub can_cancel: bool,
    pub reason: Option<String>,
    /// Saldo exigido para o gás quando ele é o impedimento
    pub required_balance: Option<U256>,
}

/// Estado do código da conta após o cancelamento
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationVerification {
    /// Falso quando a leitura falhou
    pub success: bool,
    pub is_cleared: bool,
    /// Código atual em hex, ausente quando a leitura falhou
    pub current_code: Option<String>,
    pub error: Option<String>,
}

/// Orquestra a revogação da delegação de uma conta.
///
/// A transação é enviada pela própria conta com uma autorização para o
/// endereço zero. Como o nonce da conta sobe antes das autorizações serem
/// processadas, a autorização usa `nonce + 1`.
pub struct DelegationCanceller<S> {
    submitter: Arc<S>,
    config: RemediationConfig,
}

impl<S: TransactionSubmitter> DelegationCanceller<S> {
    pub fn new(submitter: Arc<S>, config: RemediationConfig) -> Self {
        Self { submitter, config }
    }

    pub fn config(&self) -> &RemediationConfig {
        &self.config
    }

    /// Monta a transação de cancelamento assinável
    pub async fn build_transaction(
        &self,
        wallet: &LocalWallet,
        options: &CancellationOptions,
    ) -> Result<SetCodeTransaction> {
        let owner = wallet.address();
        let (nonce, chain_id, fees) = futures::try_join!(
            self.submitter.get_transaction_count(owner),
            self.submitter.get_chain_id(),
            self.submitter.get_fee_data(),
        )?;

        let gas = GasSettings::resolve(
            options.gas_limit,
            options.max_fee_per_gas,
            options.max_priority_fee_per_gas,
            self.config.cancel_gas_limit,
            &fees,
            &self.config,
        );
        let authorization = sign_authorization(wallet, chain_id, Address::zero(), nonce + 1)?;

        Ok(SetCodeTransaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas: gas.max_priority_fee_per_gas,
            max_fee_per_gas: gas.max_fee_per_gas,
            gas_limit: gas.gas_limit,
            to: owner,
            value: U256::zero(),
            data: Vec::new(),
            authorization_list: vec![authorization],
        })
    }

    /// Cancela a delegação. Nunca retorna erro; falhas vêm no resultado.
    pub async fn cancel(&self, wallet: &LocalWallet, options: &CancellationOptions) -> CancellationResult {
        let owner = wallet.address();
        info!(address = ?owner, dry_run = options.dry_run, "iniciando cancelamento");

        let tx = match self.build_transaction(wallet, options).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(address = ?owner, error = %e, "falha ao preparar cancelamento");
                return CancellationResult::not_submitted(e);
            }
        };

        if options.dry_run {
            return self.simulate(owner, &tx).await;
        }

        let raw = match tx.sign(wallet) {
            Ok(raw) => raw,
            Err(e) => return CancellationResult::not_submitted(e),
        };

        let submitted = submit_and_wait(self.submitter.as_ref(), raw, &self.config).await;
        let receipt = submitted.receipt.as_ref();
        CancellationResult {
            success: submitted.stage == SubmissionStage::Confirmed,
            transaction_hash: submitted.transaction_hash,
            error: submitted.error,
            gas_used: receipt.and_then(|r| r.gas_used),
            effective_gas_price: receipt.and_then(|r| r.effective_gas_price),
            stage: submitted.stage,
        }
    }

    async fn simulate(&self, owner: Address, tx: &SetCodeTransaction) -> CancellationResult {
        let request = tx.to_call_request(owner);
        let error = match self.submitter.call(&request).await {
            Ok(_) => {
                debug!(address = ?owner, "simulação aceita");
                None
            }
            Err(e) => {
                warn!(address = ?owner, error = %e, "simulação rejeitada");
                Some(RemediationError::Simulation(e.to_string()).to_string())
            }
        };

        CancellationResult {
            success: error.is_none(),
            transaction_hash: None,
            error,
            gas_used: None,
            effective_gas_price: None,
            stage: SubmissionStage::Simulated,
        }
    }

    /// Estima o gás do cancelamento; usa o limite padrão se a estimativa falhar
    pub async fn estimate_gas(&self, wallet: &LocalWallet) -> U256 {
        let fallback = U256::from(self.config.cancel_gas_limit);
        let tx = match self.build_transaction(wallet, &CancellationOptions::default()).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %e, "estimativa de gás falhou, usando padrão");
                return fallback;
            }
        };

        match self.submitter.estimate_gas(&tx.to_call_request(wallet.address())).await {
            Ok(gas) => gas,
            Err(e) => {
                warn!(error = %e, "estimativa de gás falhou, usando padrão");
                fallback
            }
        }
    }

    /// Verifica se há delegação ativa e saldo para o gás
    pub async fn can_cancel(&self, address: Address) -> CancelEligibility {
        let reads = futures::try_join!(
            self.submitter.get_code(address),
            self.submitter.get_balance(address),
            self.submitter.get_fee_data(),
        );
        let (code, balance, fees) = match reads {
            Ok(reads) => reads,
            Err(e) => {
                return CancelEligibility {
                    can_cancel: false,
                    reason: Some(format!("Error checking cancellation eligibility: {}", e)),
                    required_balance: None,
                }
            }
        };

        if !detect(&code).is_delegated {
            return CancelEligibility {
                can_cancel: false,
                reason: Some(REASON_NO_DELEGATION.to_string()),
                required_balance: None,
            };
        }

        let gas = GasSettings::resolve(None, None, None, self.config.cancel_gas_limit, &fees, &self.config);
        let required = gas.max_cost();
        if balance < required {
            return CancelEligibility {
                can_cancel: false,
                reason: Some(REASON_INSUFFICIENT_GAS.to_string()),
                required_balance: Some(required),
            };
        }

        CancelEligibility {
            can_cancel: true,
            reason: None,
            required_balance: None,
        }
    }

    /// Relê o código da conta para confirmar a remoção da delegação
    pub async fn verify_cancellation(&self, address: Address) -> CancellationVerification {
        match self.submitter.get_code(address).await {
            Ok(code) => CancellationVerification {
                success: true,
                is_cleared: code.is_empty(),
                current_code: Some(encode_hex(&code)),
                error: None,
            },
            Err(e) => CancellationVerification {
                success: false,
                is_cleared: false,
                current_code: None,
                error: Some(e.to_string()),
            },
        }
    }
}
