/*!
 * Alertas de ameaça
 *
 * Valores produzidos pelos classificadores e entregues a um [`AlertSink`].
 *
 * [`AlertSink`]: crate::traits::AlertSink
 */

use chrono::{DateTime, Utc};
use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::{RiskLevel, TransactionHash};

/// Categoria de ameaça publicada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    DelegationAttack,
    MaliciousWallet,
    MaliciousContract,
    BalanceDrain,
    SuspiciousActivity,
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatType::DelegationAttack => write!(f, "delegation_attack"),
            ThreatType::MaliciousWallet => write!(f, "malicious_wallet"),
            ThreatType::MaliciousContract => write!(f, "malicious_contract"),
            ThreatType::BalanceDrain => write!(f, "balance_drain"),
            ThreatType::SuspiciousActivity => write!(f, "suspicious_activity"),
        }
    }
}

/// Severidade de um alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<RiskLevel> for AlertSeverity {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => AlertSeverity::Low,
            RiskLevel::Medium => AlertSeverity::Medium,
            RiskLevel::High => AlertSeverity::High,
            RiskLevel::Critical => AlertSeverity::Critical,
        }
    }
}

impl AlertSeverity {
    /// Alertas só são publicados a partir de `High`
    pub fn is_publishable(&self) -> bool {
        *self >= AlertSeverity::High
    }
}

/// Evidência estruturada de cada tipo de ameaça
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "threat_type", content = "evidence", rename_all = "snake_case")]
pub enum AlertEvidence {
    DelegationAttack {
        delegated_to: Option<Address>,
        code_hash: H256,
        balance: U256,
        risk_factors: Vec<String>,
    },
    MaliciousWallet {
        balance: U256,
        threats: Vec<String>,
    },
    MaliciousContract {
        transaction_hash: TransactionHash,
        block_number: Option<u64>,
        to: Option<Address>,
    },
    BalanceDrain {
        balance: U256,
    },
    SuspiciousActivity {
        nonce: u64,
        notes: Vec<String>,
    },
}

impl AlertEvidence {
    pub fn threat_type(&self) -> ThreatType {
        match self {
            AlertEvidence::DelegationAttack { .. } => ThreatType::DelegationAttack,
            AlertEvidence::MaliciousWallet { .. } => ThreatType::MaliciousWallet,
            AlertEvidence::MaliciousContract { .. } => ThreatType::MaliciousContract,
            AlertEvidence::BalanceDrain { .. } => ThreatType::BalanceDrain,
            AlertEvidence::SuspiciousActivity { .. } => ThreatType::SuspiciousActivity,
        }
    }
}

/// Alerta de ameaça. O tipo é derivado da variante de evidência.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatAlert {
    pub id: String,
    pub address: Address,
    pub severity: AlertSeverity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub evidence: AlertEvidence,
}

impl ThreatAlert {
    /// Cria um alerta com id e timestamp novos
    pub fn new(
        address: Address,
        severity: AlertSeverity,
        description: impl Into<String>,
        evidence: AlertEvidence,
    ) -> Self {
        Self {
            id: format!("threat_{}", Uuid::new_v4().simple()),
            address,
            severity,
            description: description.into(),
            timestamp: Utc::now(),
            evidence,
        }
    }

    pub fn threat_type(&self) -> ThreatType {
        self.evidence.threat_type()
    }
}
