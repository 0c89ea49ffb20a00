//! Taxas, envio e acompanhamento de transações de remediação

use ethereum_types::{H256, U256};
use sentinela_core::{
    config::RemediationConfig,
    error::Result,
    traits::{ChainDataAccessor, TransactionSubmitter},
    FeeData, ReceiptInfo,
};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Até onde uma transação de remediação chegou
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    /// Falhou antes de chegar ao node
    NotSubmitted,
    /// Apenas simulada (dry run)
    Simulated,
    /// Aceita pelo node, recibo não observado
    Pending,
    /// Incluída com status 0
    Reverted,
    /// Incluída com status 1
    Confirmed,
}

/// Parâmetros de gás efetivos de uma transação
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

impl GasSettings {
    /// Combina valores explícitos, estimativa da rede e padrões
    pub fn resolve(
        gas_limit: Option<U256>,
        max_fee_per_gas: Option<U256>,
        max_priority_fee_per_gas: Option<U256>,
        default_gas_limit: u64,
        fees: &FeeData,
        config: &RemediationConfig,
    ) -> Self {
        let max_fee = max_fee_per_gas
            .or(fees.max_fee_per_gas)
            .unwrap_or(config.fallback_max_fee_per_gas);
        let priority = max_priority_fee_per_gas
            .or(fees.max_priority_fee_per_gas)
            .unwrap_or(config.fallback_max_priority_fee_per_gas);

        Self {
            gas_limit: gas_limit.unwrap_or_else(|| U256::from(default_gas_limit)),
            max_fee_per_gas: max_fee,
            // gorjeta nunca pode passar do teto
            max_priority_fee_per_gas: priority.min(max_fee),
        }
    }

    /// Custo máximo de gás (`gas_limit × max_fee_per_gas`)
    pub fn max_cost(&self) -> U256 {
        self.gas_limit.saturating_mul(self.max_fee_per_gas)
    }
}

/// Desfecho do envio de uma transação assinada
#[derive(Debug, Clone)]
pub(crate) struct Submitted {
    pub stage: SubmissionStage,
    pub transaction_hash: Option<H256>,
    pub receipt: Option<ReceiptInfo>,
    pub error: Option<String>,
}

/// Envia a transação e aguarda o recibo dentro do prazo configurado
pub(crate) async fn submit_and_wait<S>(
    submitter: &S,
    raw: Vec<u8>,
    config: &RemediationConfig,
) -> Submitted
where
    S: TransactionSubmitter + ?Sized,
{
    let tx_hash = match submitter.send_raw_transaction(raw).await {
        Ok(hash) => hash,
        Err(e) => {
            warn!(error = %e, "node recusou a transação");
            return Submitted {
                stage: SubmissionStage::NotSubmitted,
                transaction_hash: None,
                receipt: None,
                error: Some(format!("Submission failed: {}", e)),
            };
        }
    };
    info!(tx_hash = ?tx_hash, "transação enviada");

    match wait_for_receipt(submitter, tx_hash, config).await {
        Ok(Some(receipt)) => {
            let (stage, error) = if receipt.succeeded() {
                (SubmissionStage::Confirmed, None)
            } else {
                (SubmissionStage::Reverted, Some("Transaction reverted".to_string()))
            };
            info!(tx_hash = ?tx_hash, stage = ?stage, "transação incluída");
            Submitted {
                stage,
                transaction_hash: Some(tx_hash),
                receipt: Some(receipt),
                error,
            }
        }
        Ok(None) => Submitted {
            stage: SubmissionStage::Pending,
            transaction_hash: Some(tx_hash),
            receipt: None,
            error: Some(format!(
                "Transaction submitted but no receipt observed within {} ms",
                config.receipt_timeout_ms
            )),
        },
        Err(e) => Submitted {
            stage: SubmissionStage::Pending,
            transaction_hash: Some(tx_hash),
            receipt: None,
            error: Some(format!("Transaction submitted but receipt lookup failed: {}", e)),
        },
    }
}

/// Consulta o recibo até ele aparecer ou o prazo acabar.
///
/// Retorna `None` quando o prazo acaba sem recibo.
pub(crate) async fn wait_for_receipt<C>(
    accessor: &C,
    tx_hash: H256,
    config: &RemediationConfig,
) -> Result<Option<ReceiptInfo>>
where
    C: ChainDataAccessor + ?Sized,
{
    let deadline = Instant::now() + config.receipt_timeout();
    loop {
        if let Some(receipt) = accessor.get_transaction_receipt(tx_hash).await? {
            return Ok(Some(receipt));
        }
        if Instant::now() >= deadline {
            warn!(tx_hash = ?tx_hash, "recibo não observado no prazo");
            return Ok(None);
        }
        debug!(tx_hash = ?tx_hash, "aguardando recibo");
        sleep(config.receipt_poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinela_core::utils::gwei;

    #[test]
    fn explicit_values_win() {
        let fees = FeeData {
            gas_price: None,
            max_fee_per_gas: Some(gwei(50)),
            max_priority_fee_per_gas: Some(gwei(3)),
        };
        let gas = GasSettings::resolve(
            Some(U256::from(60_000u64)),
            Some(gwei(10)),
            None,
            100_000,
            &fees,
            &RemediationConfig::default(),
        );
        assert_eq!(gas.gas_limit, U256::from(60_000u64));
        assert_eq!(gas.max_fee_per_gas, gwei(10));
        assert_eq!(gas.max_priority_fee_per_gas, gwei(3));
        assert_eq!(gas.max_cost(), gwei(10) * 60_000u64);
    }

    #[test]
    fn falls_back_without_network_estimates() {
        let gas = GasSettings::resolve(
            None,
            None,
            None,
            21_000,
            &FeeData::default(),
            &RemediationConfig::default(),
        );
        assert_eq!(gas.gas_limit, U256::from(21_000u64));
        assert_eq!(gas.max_fee_per_gas, gwei(20));
        assert_eq!(gas.max_priority_fee_per_gas, gwei(2));
    }

    #[test]
    fn priority_is_capped_by_max_fee() {
        let gas = GasSettings::resolve(
            None,
            Some(gwei(1)),
            None,
            21_000,
            &FeeData::default(),
            &RemediationConfig::default(),
        );
        assert_eq!(gas.max_priority_fee_per_gas, gwei(1));
    }
}
