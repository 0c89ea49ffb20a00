use ethereum_types::{Address, H256, U256};
use sentinela_core::{
    config::RiskThresholds, utils::keccak256, AccountSnapshot, MaliciousRegistry, RiskLevel,
};
use serde::{Deserialize, Serialize};

use crate::delegation::{detect, DelegationRule};

pub const FACTOR_HIGH_BALANCE: &str = "high balance at risk";
pub const FACTOR_VERY_HIGH_BALANCE: &str = "very high balance at risk";
pub const FACTOR_HIGH_ACTIVITY: &str = "high transaction activity";
pub const FACTOR_ZERO_TARGET: &str = "delegated to zero address (unusual)";
pub const FACTOR_RISKY_TARGET: &str = "delegated to potentially risky contract";
pub const FACTOR_DELEGATION_ACTIVE: &str = "delegation active";
pub const FACTOR_MALICIOUS_WALLET: &str = "address is a known malicious wallet";
pub const FACTOR_INCONSISTENT_RECORD: &str = "inconsistent delegation record (anomaly)";

/// Estado de delegação de uma conta com o veredito de risco
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRecord {
    pub is_delegated: bool,
    pub delegated_to: Option<Address>,
    pub code_hash: H256,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    /// Regra de detecção que disparou, se alguma
    pub rule: Option<DelegationRule>,
}

impl DelegationRecord {
    /// Registro ainda não classificado, derivado apenas do código
    pub fn from_code(code: &[u8]) -> Self {
        let detection = detect(code);
        Self {
            is_delegated: detection.is_delegated,
            delegated_to: detection.delegated_to,
            code_hash: H256(keccak256(code)),
            risk_level: RiskLevel::Low,
            risk_factors: Vec::new(),
            rule: detection.rule,
        }
    }

    /// Verdadeiro quando a delegação veio de uma regra heurística
    pub fn is_heuristic(&self) -> bool {
        self.rule.map(|r| r.is_heuristic()).unwrap_or(false)
    }

    fn raise(&mut self, level: RiskLevel, factor: &str) {
        self.risk_level = self.risk_level.max(level);
        self.risk_factors.push(factor.to_string());
    }
}

/// Classificador de risco de delegação.
///
/// A severidade só sobe durante uma passada.
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
    registry: MaliciousRegistry,
}

impl RiskClassifier {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self {
            thresholds,
            registry: MaliciousRegistry::global().clone(),
        }
    }

    pub fn with_registry(mut self, registry: MaliciousRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &MaliciousRegistry {
        &self.registry
    }

    /// Detecta e classifica a partir de um snapshot
    pub fn evaluate(&self, snapshot: &AccountSnapshot) -> DelegationRecord {
        self.classify(
            snapshot.address,
            snapshot.balance,
            snapshot.nonce,
            DelegationRecord::from_code(&snapshot.code),
        )
    }

    /// Preenche nível e fatores de risco de um registro
    pub fn classify(
        &self,
        address: Address,
        balance: U256,
        nonce: u64,
        mut record: DelegationRecord,
    ) -> DelegationRecord {
        record.risk_level = RiskLevel::Low;
        record.risk_factors.clear();

        match (record.is_delegated, record.delegated_to) {
            (true, Some(target)) => self.classify_delegation(&mut record, target, balance, nonce),
            (false, None) => {}
            // flag e alvo divergentes
            _ => record.raise(RiskLevel::Medium, FACTOR_INCONSISTENT_RECORD),
        }

        if self.registry.contains(&address) {
            record.raise(RiskLevel::Critical, FACTOR_MALICIOUS_WALLET);
        }

        record
    }

    fn classify_delegation(
        &self,
        record: &mut DelegationRecord,
        target: Address,
        balance: U256,
        nonce: u64,
    ) {
        if balance > self.thresholds.high_balance_wei {
            record.raise(RiskLevel::High, FACTOR_HIGH_BALANCE);
        }
        if balance > self.thresholds.very_high_balance_wei {
            record.raise(RiskLevel::Critical, FACTOR_VERY_HIGH_BALANCE);
        }
        if nonce > self.thresholds.high_activity_nonce {
            record.raise(RiskLevel::Medium, FACTOR_HIGH_ACTIVITY);
        }
        // alvo zerado de regra heurística é só preenchimento, não um alvo real
        if target.is_zero() && !record.is_heuristic() {
            record.risk_factors.push(FACTOR_ZERO_TARGET.to_string());
        }
        if self.registry.contains(&target) {
            record.raise(RiskLevel::Critical, FACTOR_RISKY_TARGET);
        }
        if record.risk_factors.is_empty() {
            record.raise(RiskLevel::Medium, FACTOR_DELEGATION_ACTIVE);
        }
    }
}
