mod common;

use common::{delegation_code, ether, malicious_target};
use ethereum_types::{Address, U256};
use sentinela_core::{utils::parse_ether, AccountSnapshot, MaliciousRegistry, RiskLevel};
use sentinela_detector::{
    DelegationRecord, RiskClassifier, FACTOR_DELEGATION_ACTIVE, FACTOR_HIGH_ACTIVITY,
    FACTOR_HIGH_BALANCE, FACTOR_INCONSISTENT_RECORD, FACTOR_MALICIOUS_WALLET, FACTOR_RISKY_TARGET,
    FACTOR_VERY_HIGH_BALANCE, FACTOR_ZERO_TARGET,
};

fn wallet() -> Address {
    Address::repeat_byte(0x11)
}

fn classify(balance: U256, nonce: u64, target: Address) -> DelegationRecord {
    RiskClassifier::default().classify(
        wallet(),
        balance,
        nonce,
        DelegationRecord::from_code(&delegation_code(target)),
    )
}

#[test]
fn two_native_units_is_critical() {
    let record = classify(ether(2), 5, Address::repeat_byte(0x22));
    assert_eq!(record.risk_level, RiskLevel::Critical);
    assert!(record.risk_factors.contains(&FACTOR_HIGH_BALANCE.to_string()));
    assert!(record.risk_factors.contains(&FACTOR_VERY_HIGH_BALANCE.to_string()));
}

#[test]
fn very_high_balance_boundary_is_strict() {
    let at_limit = classify(parse_ether("1.0").unwrap(), 5, Address::repeat_byte(0x22));
    assert_eq!(at_limit.risk_level, RiskLevel::High);
    assert_eq!(at_limit.risk_factors, vec![FACTOR_HIGH_BALANCE.to_string()]);

    let above = classify(parse_ether("1.000000001").unwrap(), 5, Address::repeat_byte(0x22));
    assert_eq!(above.risk_level, RiskLevel::Critical);
    assert!(above.risk_factors.contains(&FACTOR_VERY_HIGH_BALANCE.to_string()));
}

#[test]
fn high_balance_boundary_is_strict() {
    let at_limit = classify(parse_ether("0.1").unwrap(), 0, Address::repeat_byte(0x22));
    assert_eq!(at_limit.risk_level, RiskLevel::Medium);
    assert_eq!(at_limit.risk_factors, vec![FACTOR_DELEGATION_ACTIVE.to_string()]);
}

#[test]
fn registry_target_beats_low_balance() {
    let record = classify(parse_ether("0.05").unwrap(), 0, malicious_target());
    assert_eq!(record.risk_level, RiskLevel::Critical);
    assert_eq!(record.risk_factors, vec![FACTOR_RISKY_TARGET.to_string()]);
}

#[test]
fn registry_target_is_always_critical() {
    let balances = [U256::zero(), parse_ether("0.05").unwrap(), parse_ether("0.5").unwrap(), ether(3)];
    for balance in balances {
        for nonce in [0u64, 50, 101, 5000] {
            let benign = classify(balance, nonce, Address::repeat_byte(0x33));
            let malicious = classify(balance, nonce, malicious_target());
            assert_eq!(malicious.risk_level, RiskLevel::Critical);
            assert!(malicious.risk_level >= benign.risk_level);
        }
    }
}

#[test]
fn activity_only_raises_low_to_medium() {
    let active = classify(U256::zero(), 101, Address::repeat_byte(0x22));
    assert_eq!(active.risk_level, RiskLevel::Medium);
    assert_eq!(active.risk_factors, vec![FACTOR_HIGH_ACTIVITY.to_string()]);

    let rich = classify(parse_ether("0.5").unwrap(), 101, Address::repeat_byte(0x22));
    assert_eq!(rich.risk_level, RiskLevel::High);
    assert_eq!(
        rich.risk_factors,
        vec![FACTOR_HIGH_BALANCE.to_string(), FACTOR_HIGH_ACTIVITY.to_string()]
    );
}

#[test]
fn zero_target_is_informational() {
    let record = classify(U256::zero(), 0, Address::zero());
    assert!(record.is_delegated);
    assert_eq!(record.delegated_to, Some(Address::zero()));
    assert_eq!(record.risk_level, RiskLevel::Low);
    assert_eq!(record.risk_factors, vec![FACTOR_ZERO_TARGET.to_string()]);
}

#[test]
fn plain_delegation_gets_generic_factor() {
    let record = classify(U256::zero(), 0, Address::repeat_byte(0x44));
    assert_eq!(record.risk_level, RiskLevel::Medium);
    assert_eq!(record.risk_factors, vec![FACTOR_DELEGATION_ACTIVE.to_string()]);
}

#[test]
fn delegated_records_always_have_factors() {
    for code in [delegation_code(Address::zero()), vec![0xfe], vec![0xef, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]] {
        let record = RiskClassifier::default().classify(wallet(), U256::zero(), 0, DelegationRecord::from_code(&code));
        assert!(record.is_delegated);
        assert!(record.delegated_to.is_some());
        assert!(!record.risk_factors.is_empty());
    }
}

#[test]
fn heuristic_match_with_padded_target_is_at_least_medium() {
    let classifier = RiskClassifier::default();
    for code in [vec![0xfe], vec![0xfe, 0x00, 0x00], vec![0xef, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]] {
        let snapshot = AccountSnapshot {
            address: wallet(),
            code,
            balance: U256::zero(),
            nonce: 0,
            chain_id: 10143,
        };
        let record = classifier.evaluate(&snapshot);
        assert!(record.is_heuristic());
        assert_eq!(record.delegated_to, Some(Address::zero()));
        assert!(record.risk_level >= RiskLevel::Medium);
        assert_eq!(record.risk_factors, vec![FACTOR_DELEGATION_ACTIVE.to_string()]);
    }
}

#[test]
fn undelegated_account_is_low_without_factors() {
    let record = RiskClassifier::default().classify(wallet(), ether(10), 5000, DelegationRecord::from_code(&[]));
    assert!(!record.is_delegated);
    assert_eq!(record.delegated_to, None);
    assert_eq!(record.risk_level, RiskLevel::Low);
    assert!(record.risk_factors.is_empty());
}

#[test]
fn malicious_wallet_takes_precedence() {
    let classifier = RiskClassifier::default();
    let record = classifier.classify(malicious_target(), U256::zero(), 0, DelegationRecord::from_code(&[]));
    assert_eq!(record.risk_level, RiskLevel::Critical);
    assert_eq!(record.risk_factors, vec![FACTOR_MALICIOUS_WALLET.to_string()]);
}

#[test]
fn inconsistent_record_is_medium_anomaly() {
    let mut record = DelegationRecord::from_code(&delegation_code(Address::repeat_byte(0x55)));
    record.delegated_to = None;
    let record = RiskClassifier::default().classify(wallet(), ether(5), 0, record);
    assert_eq!(record.risk_level, RiskLevel::Medium);
    assert_eq!(record.risk_factors, vec![FACTOR_INCONSISTENT_RECORD.to_string()]);
}

#[test]
fn custom_registry_is_respected() {
    let target = Address::repeat_byte(0x66);
    let registry = MaliciousRegistry::from_entries(["0x6666666666666666666666666666666666666666"]);
    let classifier = RiskClassifier::default().with_registry(registry);
    let snapshot = AccountSnapshot {
        address: wallet(),
        code: delegation_code(target),
        balance: U256::zero(),
        nonce: 0,
        chain_id: 10143,
    };
    let record = classifier.evaluate(&snapshot);
    assert_eq!(record.risk_level, RiskLevel::Critical);
    assert_eq!(record.code_hash, snapshot.code_hash());
    assert!(!record.is_heuristic());
}
