use chrono::{DateTime, Utc};
use ethereum_types::{Address, H256, U256};
use sentinela_core::{
    config::AssessorThresholds, traits::ChainDataAccessor, utils::format_ether, AccountSnapshot,
    AlertSeverity, MaliciousRegistry, MONAD_TESTNET_CHAIN_ID,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::delegation::detect;

/// Nível de ameaça do avaliador
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatLevel::Safe => write!(f, "SAFE"),
            ThreatLevel::Low => write!(f, "LOW"),
            ThreatLevel::Medium => write!(f, "MEDIUM"),
            ThreatLevel::High => write!(f, "HIGH"),
            ThreatLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl From<ThreatLevel> for AlertSeverity {
    fn from(level: ThreatLevel) -> Self {
        match level {
            ThreatLevel::Safe | ThreatLevel::Low => AlertSeverity::Low,
            ThreatLevel::Medium => AlertSeverity::Medium,
            ThreatLevel::High => AlertSeverity::High,
            ThreatLevel::Critical => AlertSeverity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatKind {
    CriticalDelegation,
    UnknownDelegation,
    ZeroBalance,
    LowBalance,
    HighActivity,
    AssessmentError,
}

/// Ameaça individual encontrada na avaliação
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    pub kind: ThreatKind,
    pub description: String,
    pub recommendation: String,
}

/// Resultado da avaliação imediata de uma carteira
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub address: Address,
    pub threat_level: ThreatLevel,
    /// 0 = comprometimento certo, 100 = nada encontrado
    pub safety_score: u8,
    pub threats: Vec<Threat>,
    pub delegated_to: Option<Address>,
    pub code_hash: Option<H256>,
    pub balance: Option<U256>,
    pub nonce: Option<u64>,
    pub assessed_at: DateTime<Utc>,
}

impl ThreatAssessment {
    fn new(address: Address) -> Self {
        Self {
            address,
            threat_level: ThreatLevel::Safe,
            safety_score: 100,
            threats: Vec::new(),
            delegated_to: None,
            code_hash: None,
            balance: None,
            nonce: None,
            assessed_at: Utc::now(),
        }
    }

    /// Resultado conservador quando alguma leitura falhou
    pub fn failed(address: Address, reason: impl fmt::Display) -> Self {
        let mut assessment = Self::new(address);
        assessment.threat_level = ThreatLevel::Medium;
        assessment.safety_score = 50;
        assessment.threats.push(Threat {
            kind: ThreatKind::AssessmentError,
            description: format!("Unable to assess wallet security: {}", reason),
            recommendation: "Manual verification required".to_string(),
        });
        assessment
    }

    /// Aplica piso de nível e teto de score
    fn apply(&mut self, floor: ThreatLevel, cap: u8, kind: ThreatKind, description: String, recommendation: &str) {
        self.threat_level = self.threat_level.max(floor);
        self.safety_score = self.safety_score.min(cap);
        self.threats.push(Threat {
            kind,
            description,
            recommendation: recommendation.to_string(),
        });
    }

    pub fn is_delegated(&self) -> bool {
        self.delegated_to.is_some()
    }
}

/// Avaliador de ameaças com limiares próprios, usado por monitores automáticos
pub struct ThreatAssessor<C> {
    accessor: Arc<C>,
    thresholds: AssessorThresholds,
    registry: MaliciousRegistry,
    chain_id: u64,
}

impl<C> ThreatAssessor<C> {
    pub fn new(accessor: Arc<C>, thresholds: AssessorThresholds) -> Self {
        Self {
            accessor,
            thresholds,
            registry: MaliciousRegistry::global().clone(),
            chain_id: MONAD_TESTNET_CHAIN_ID,
        }
    }

    pub fn with_registry(mut self, registry: MaliciousRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Chain id registrado nos snapshots; a avaliação não o consulta
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Avalia um snapshot já capturado
    pub fn assess_snapshot(&self, snapshot: &AccountSnapshot) -> ThreatAssessment {
        let mut assessment = ThreatAssessment::new(snapshot.address);
        assessment.code_hash = Some(snapshot.code_hash());
        assessment.balance = Some(snapshot.balance);
        assessment.nonce = Some(snapshot.nonce);

        let detection = detect(&snapshot.code);
        if detection.is_delegated {
            let target = detection.delegated_to.unwrap_or_default();
            assessment.delegated_to = Some(target);
            if self.registry.contains(&target) {
                assessment.apply(
                    ThreatLevel::Critical,
                    0,
                    ThreatKind::CriticalDelegation,
                    format!("Wallet is delegated to known malicious contract: {:?}", target),
                    "IMMEDIATE: Cancel delegation and transfer funds to new wallet",
                );
            } else {
                assessment.apply(
                    ThreatLevel::High,
                    25,
                    ThreatKind::UnknownDelegation,
                    format!("Wallet is delegated to unknown contract: {:?}", target),
                    "Verify delegation legitimacy and monitor for suspicious activity",
                );
            }
        }

        if snapshot.balance.is_zero() {
            assessment.apply(
                ThreatLevel::Medium,
                50,
                ThreatKind::ZeroBalance,
                "Wallet has zero balance - may have been drained".to_string(),
                "Investigate recent transactions for unauthorized transfers",
            );
        } else if snapshot.balance < self.thresholds.low_balance_wei {
            assessment.apply(
                ThreatLevel::Low,
                75,
                ThreatKind::LowBalance,
                format!("Unusually low balance: {}", format_ether(&snapshot.balance)),
                "Check for recent large outgoing transactions",
            );
        }

        if snapshot.nonce > self.thresholds.high_activity_nonce {
            assessment.apply(
                ThreatLevel::Low,
                85,
                ThreatKind::HighActivity,
                format!(
                    "High transaction count ({}) - review for suspicious activity",
                    snapshot.nonce
                ),
                "Check recent transactions for unauthorized activity",
            );
        }

        assessment
    }
}

impl<C: ChainDataAccessor> ThreatAssessor<C> {
    /// Avaliação imediata. Falhas de leitura viram um resultado MEDIUM.
    pub async fn assess(&self, address: Address) -> ThreatAssessment {
        match AccountSnapshot::capture_state(self.accessor.as_ref(), address, self.chain_id).await {
            Ok(snapshot) => {
                let assessment = self.assess_snapshot(&snapshot);
                debug!(
                    address = ?address,
                    level = %assessment.threat_level,
                    score = assessment.safety_score,
                    "avaliação concluída"
                );
                assessment
            }
            Err(e) => {
                warn!(address = ?address, error = %e, "falha ao avaliar carteira");
                ThreatAssessment::failed(address, e)
            }
        }
    }
}
