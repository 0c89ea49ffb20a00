use chrono::{DateTime, Utc};
use ethereum_types::Address;
use sentinela_core::{
    error::Result,
    traits::{AlertSink, ChainDataAccessor},
    utils::{format_address, format_ether, parse_address},
    AccountSnapshot, AlertEvidence, AlertSeverity, RiskLevel, ThreatAlert,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::risk_classifier::RiskClassifier;

pub const THREAT_MALICIOUS_WALLET: &str = "known malicious wallet";
pub const THREAT_DELEGATION: &str = "EIP-7702 delegation detected";
pub const THREAT_MALICIOUS_TARGET: &str = "delegated to known malicious contract";
pub const THREAT_HIGH_VOLUME: &str = "high transaction volume (potential bot)";
pub const THREAT_SCAN_ERROR: &str = "scan error - unable to complete full analysis";

/// Nonce acima do qual a varredura aponta volume alto
const HIGH_VOLUME_NONCE: u64 = 1000;

/// Nível de risco no formato de saída da varredura
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanRiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl From<RiskLevel> for ScanRiskLevel {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => ScanRiskLevel::Low,
            RiskLevel::Medium => ScanRiskLevel::Medium,
            RiskLevel::High => ScanRiskLevel::High,
            RiskLevel::Critical => ScanRiskLevel::Critical,
        }
    }
}

impl ScanRiskLevel {
    pub fn alert_severity(&self) -> Option<AlertSeverity> {
        match self {
            ScanRiskLevel::High => Some(AlertSeverity::High),
            ScanRiskLevel::Critical => Some(AlertSeverity::Critical),
            _ => None,
        }
    }
}

/// Registro de varredura entregue a consumidores externos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletScan {
    pub address: String,
    pub has_delegation: bool,
    pub delegated_to: Option<String>,
    /// Saldo na moeda nativa
    pub balance: String,
    pub risk_level: ScanRiskLevel,
    pub threats: Vec<String>,
    pub last_scanned: DateTime<Utc>,
}

/// Varredura pontual de carteiras com publicação de alertas
pub struct WalletScanner<C> {
    accessor: Arc<C>,
    classifier: RiskClassifier,
    sink: Arc<dyn AlertSink>,
}

impl<C> WalletScanner<C> {
    pub fn new(accessor: Arc<C>, classifier: RiskClassifier, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            accessor,
            classifier,
            sink,
        }
    }

    /// Monta o registro de varredura e, se for o caso, o alerta
    pub fn scan_snapshot(&self, snapshot: &AccountSnapshot) -> (WalletScan, Option<ThreatAlert>) {
        let record = self.classifier.evaluate(snapshot);
        let registry = self.classifier.registry();

        let mut threats = Vec::new();
        if registry.contains(&snapshot.address) {
            threats.push(THREAT_MALICIOUS_WALLET.to_string());
        }
        if record.is_delegated {
            threats.push(THREAT_DELEGATION.to_string());
            if record.delegated_to.map(|t| registry.contains(&t)).unwrap_or(false) {
                threats.push(THREAT_MALICIOUS_TARGET.to_string());
            }
        }
        if snapshot.nonce > HIGH_VOLUME_NONCE {
            threats.push(THREAT_HIGH_VOLUME.to_string());
        }

        let risk_level = if record.risk_factors.is_empty() && threats.is_empty() {
            ScanRiskLevel::Safe
        } else {
            ScanRiskLevel::from(record.risk_level)
        };

        let scan = WalletScan {
            address: format_address(&snapshot.address),
            has_delegation: record.is_delegated,
            delegated_to: record.delegated_to.as_ref().map(format_address),
            balance: format_ether(&snapshot.balance),
            risk_level,
            threats,
            last_scanned: Utc::now(),
        };

        let alert = risk_level.alert_severity().map(|severity| {
            let evidence = if record.is_delegated {
                AlertEvidence::DelegationAttack {
                    delegated_to: record.delegated_to,
                    code_hash: record.code_hash,
                    balance: snapshot.balance,
                    risk_factors: record.risk_factors.clone(),
                }
            } else {
                AlertEvidence::MaliciousWallet {
                    balance: snapshot.balance,
                    threats: scan.threats.clone(),
                }
            };
            ThreatAlert::new(snapshot.address, severity, scan.threats.join(", "), evidence)
        });

        (scan, alert)
    }

    fn failed_scan(address: Address) -> WalletScan {
        WalletScan {
            address: format_address(&address),
            has_delegation: false,
            delegated_to: None,
            balance: "0.0".to_string(),
            risk_level: ScanRiskLevel::Medium,
            threats: vec![THREAT_SCAN_ERROR.to_string()],
            last_scanned: Utc::now(),
        }
    }
}

impl<C: ChainDataAccessor> WalletScanner<C> {
    /// Varre uma carteira informada como texto.
    ///
    /// Endereço inválido é rejeitado antes de qualquer leitura; falhas de
    /// leitura produzem uma varredura `medium`.
    pub async fn scan(&self, address: &str) -> Result<WalletScan> {
        let address = parse_address(address)?;
        self.sink.record_scan().await;

        let snapshot = match AccountSnapshot::capture(self.accessor.as_ref(), address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(address = ?address, error = %e, "varredura incompleta");
                return Ok(Self::failed_scan(address));
            }
        };

        let (scan, alert) = self.scan_snapshot(&snapshot);
        if let Some(alert) = alert {
            info!(address = ?address, severity = ?alert.severity, "publicando alerta");
            if let Err(e) = self.sink.publish(alert).await {
                warn!(address = ?address, error = %e, "falha ao publicar alerta");
            }
        }
        Ok(scan)
    }
}
