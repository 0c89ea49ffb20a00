use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::MONAD_TESTNET_CHAIN_ID;
use crate::utils::gwei;

/// Endpoint RPC público da testnet Monad
pub const DEFAULT_RPC_URL: &str = "https://testnet-rpc.monad.xyz";

/// Limiares do classificador de risco de delegação
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Saldo acima do qual o risco é pelo menos HIGH (0.1 nativo)
    pub high_balance_wei: U256,
    /// Saldo acima do qual o risco é CRITICAL (1.0 nativo)
    pub very_high_balance_wei: U256,
    /// Nonce acima do qual a atividade é considerada alta
    pub high_activity_nonce: u64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_balance_wei: U256::exp10(17),
            very_high_balance_wei: U256::exp10(18),
            high_activity_nonce: 100,
        }
    }
}

/// Limiares do avaliador de ameaças
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessorThresholds {
    /// Saldo abaixo do qual a carteira é considerada com saldo baixo (1.0 nativo)
    pub low_balance_wei: U256,
    pub high_activity_nonce: u64,
}

impl Default for AssessorThresholds {
    fn default() -> Self {
        Self {
            low_balance_wei: U256::exp10(18),
            high_activity_nonce: 1000,
        }
    }
}

/// Configuração das verificações de segurança prévias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Reserva mínima para gás (0.001 nativo)
    pub min_gas_reserve_wei: U256,
    pub activity_nonce: u64,
    /// Teto de `maxFeePerGas` antes de sugerir espera (100 gwei)
    pub max_fee_ceiling_wei: U256,
    pub expected_chain_id: u64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            min_gas_reserve_wei: U256::exp10(15),
            activity_nonce: 1000,
            max_fee_ceiling_wei: gwei(100),
            expected_chain_id: MONAD_TESTNET_CHAIN_ID,
        }
    }
}

/// Parâmetros de cancelamento e transferência de emergência
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    pub cancel_gas_limit: u64,
    pub transfer_gas_limit: u64,
    pub fallback_max_fee_per_gas: U256,
    pub fallback_max_priority_fee_per_gas: U256,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_ms: u64,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            cancel_gas_limit: 100_000,
            transfer_gas_limit: 21_000,
            fallback_max_fee_per_gas: gwei(20),
            fallback_max_priority_fee_per_gas: gwei(2),
            receipt_poll_interval_ms: 2_000,
            receipt_timeout_ms: 120_000,
        }
    }
}

impl RemediationConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }
}

/// Armazenamento e entrega de alertas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Quantidade máxima de alertas mantidos em memória
    pub capacity: usize,
    pub webhook_url: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            webhook_url: None,
        }
    }
}

/// Monitoramento periódico de carteiras
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    pub error_backoff_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 30_000,
            error_backoff_ms: 5_000,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

/// Configuração completa da Sentinela
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelaConfig {
    pub rpc_url: String,
    pub risk: RiskThresholds,
    pub assessor: AssessorThresholds,
    pub preflight: PreflightConfig,
    pub remediation: RemediationConfig,
    pub alerts: AlertConfig,
    pub monitor: MonitorConfig,
}

impl Default for SentinelaConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            risk: RiskThresholds::default(),
            assessor: AssessorThresholds::default(),
            preflight: PreflightConfig::default(),
            remediation: RemediationConfig::default(),
            alerts: AlertConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl SentinelaConfig {
    /// Lê a configuração de um documento JSON; campos ausentes usam o padrão
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("JSON inválido: {}", e)))
    }

    /// Configuração padrão com sobrescritas do ambiente
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Aplica `SENTINELA_RPC_URL`, `SENTINELA_CHAIN_ID` e `SENTINELA_WEBHOOK_URL`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("SENTINELA_RPC_URL") {
            debug!(rpc_url = %url, "endpoint RPC definido pelo ambiente");
            self.rpc_url = url;
        }
        if let Ok(chain_id) = std::env::var("SENTINELA_CHAIN_ID") {
            self.preflight.expected_chain_id = chain_id
                .parse()
                .map_err(|_| Error::Config(format!("SENTINELA_CHAIN_ID inválido: {}", chain_id)))?;
        }
        if let Ok(webhook) = std::env::var("SENTINELA_WEBHOOK_URL") {
            debug!("webhook de alertas definido pelo ambiente");
            self.alerts.webhook_url = Some(webhook);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SentinelaConfig::from_json_str(
            r#"{"rpc_url":"http://localhost:8545","preflight":{"expected_chain_id":1}}"#,
        )
        .unwrap();
        assert_eq!(cfg.rpc_url, "http://localhost:8545");
        assert_eq!(cfg.preflight.expected_chain_id, 1);
        assert_eq!(cfg.preflight.activity_nonce, 1000);
        assert_eq!(cfg.risk, RiskThresholds::default());
        assert_eq!(cfg.alerts.capacity, 100);
    }

    #[test]
    fn invalid_json_is_config_error() {
        assert!(matches!(SentinelaConfig::from_json_str("{"), Err(Error::Config(_))));
    }
}
