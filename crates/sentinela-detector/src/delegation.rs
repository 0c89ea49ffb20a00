use ethereum_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefixo de delegação EIP-7702
pub const DELEGATION_PREFIX: [u8; 3] = [0xef, 0x01, 0x00];

/// Tamanho do código de delegação canônico (prefixo + endereço)
pub const DELEGATION_CODE_LEN: usize = 23;

/// Regras de detecção, avaliadas em ordem.
///
/// Apenas [`DelegationRule::Canonical`] segue o formato exato da EIP-7702.
/// As demais aumentam o recall às custas de falsos positivos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationRule {
    /// `0xef0100` seguido de exatamente 20 bytes
    Canonical,
    /// Começa com `0xef01` e tem ao menos 12 bytes
    ShortPrefix,
    /// Código curto (< 49 bytes) que não começa com `0x60` nem `0x30`
    NonStandardBytecode,
}

pub const DELEGATION_RULES: [DelegationRule; 3] = [
    DelegationRule::Canonical,
    DelegationRule::ShortPrefix,
    DelegationRule::NonStandardBytecode,
];

impl DelegationRule {
    pub fn matches(&self, code: &[u8]) -> bool {
        match self {
            DelegationRule::Canonical => {
                code.len() == DELEGATION_CODE_LEN && code.starts_with(&DELEGATION_PREFIX)
            }
            // "0x" + 2 * len >= 26
            DelegationRule::ShortPrefix => code.len() >= 12 && code.starts_with(&DELEGATION_PREFIX[..2]),
            // "0x" + 2 * len < 100
            DelegationRule::NonStandardBytecode => {
                !code.is_empty() && code.len() <= 48 && code[0] != 0x60 && code[0] != 0x30
            }
        }
    }

    pub fn is_heuristic(&self) -> bool {
        !matches!(self, DelegationRule::Canonical)
    }
}

impl fmt::Display for DelegationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegationRule::Canonical => write!(f, "canonical"),
            DelegationRule::ShortPrefix => write!(f, "short_prefix"),
            DelegationRule::NonStandardBytecode => write!(f, "non_standard_bytecode"),
        }
    }
}

/// Resultado da detecção sobre um bytecode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub is_delegated: bool,
    pub delegated_to: Option<Address>,
    pub rule: Option<DelegationRule>,
}

impl Detection {
    pub fn none() -> Self {
        Self {
            is_delegated: false,
            delegated_to: None,
            rule: None,
        }
    }
}

/// Detecta delegação EIP-7702 no código de uma conta.
///
/// Função pura: nunca falha e não consulta a rede.
pub fn detect(code: &[u8]) -> Detection {
    match DELEGATION_RULES.iter().find(|rule| rule.matches(code)) {
        Some(rule) => Detection {
            is_delegated: true,
            delegated_to: Some(extract_target(code)),
            rule: Some(*rule),
        },
        None => Detection::none(),
    }
}

/// Endereço nos bytes `3..23`. Códigos mais curtos são completados com zeros.
fn extract_target(code: &[u8]) -> Address {
    let mut target = [0u8; 20];
    if code.len() > 3 {
        let available = &code[3..code.len().min(DELEGATION_CODE_LEN)];
        target[..available.len()].copy_from_slice(available);
    }
    Address::from(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(target: Address) -> Vec<u8> {
        let mut code = DELEGATION_PREFIX.to_vec();
        code.extend_from_slice(target.as_bytes());
        code
    }

    #[test]
    fn canonical_rule_extracts_target() {
        let target = Address::repeat_byte(0xab);
        let det = detect(&canonical(target));
        assert!(det.is_delegated);
        assert_eq!(det.delegated_to, Some(target));
        assert_eq!(det.rule, Some(DelegationRule::Canonical));
    }

    #[test]
    fn empty_code_is_never_delegated() {
        assert_eq!(detect(&[]), Detection::none());
        for rule in DELEGATION_RULES {
            assert!(!rule.matches(&[]));
        }
    }

    #[test]
    fn short_prefix_rule_alone() {
        // 0xef01 + 10 bytes, longo demais para NonStandardBytecode não importa: regra própria
        let code = [0xef, 0x01, 0x00, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        assert!(!DelegationRule::Canonical.matches(&code));
        assert!(DelegationRule::ShortPrefix.matches(&code));
        let det = detect(&code);
        assert_eq!(det.rule, Some(DelegationRule::ShortPrefix));
        let mut expected = [0u8; 20];
        expected[..9].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(det.delegated_to, Some(Address::from(expected)));
    }

    #[test]
    fn short_prefix_needs_twelve_bytes() {
        let code = [0xef, 0x01, 0x00, 1, 2, 3, 4, 5, 6, 7, 8];
        assert!(!DelegationRule::ShortPrefix.matches(&code));
        // ainda é capturado pela heurística de bytecode não padrão
        assert_eq!(detect(&code).rule, Some(DelegationRule::NonStandardBytecode));
    }

    #[test]
    fn long_short_prefix_code_is_short_prefix() {
        let mut code = vec![0xef, 0x01];
        code.extend(std::iter::repeat(0x11).take(60));
        assert!(!DelegationRule::NonStandardBytecode.matches(&code));
        assert_eq!(detect(&code).rule, Some(DelegationRule::ShortPrefix));
    }

    #[test]
    fn non_standard_rule_alone() {
        let code = [0xfe, 0x00, 0x01];
        assert!(!DelegationRule::Canonical.matches(&code));
        assert!(!DelegationRule::ShortPrefix.matches(&code));
        assert!(DelegationRule::NonStandardBytecode.matches(&code));
        let det = detect(&code);
        assert!(det.is_delegated);
        assert!(det.delegated_to.is_some());
    }

    #[test]
    fn standard_bytecode_markers_are_ignored() {
        assert!(!detect(&[0x60, 0x80, 0x60, 0x40, 0x52]).is_delegated);
        assert!(!detect(&[0x30, 0x31]).is_delegated);
    }

    #[test]
    fn non_standard_boundary_is_48_bytes() {
        let at_limit = vec![0xaa; 48];
        let over = vec![0xaa; 49];
        assert!(DelegationRule::NonStandardBytecode.matches(&at_limit));
        assert!(!DelegationRule::NonStandardBytecode.matches(&over));
        assert!(!detect(&over).is_delegated);
    }

    #[test]
    fn malformed_canonical_prefix_does_not_panic() {
        for len in 0..DELEGATION_CODE_LEN {
            let mut code = DELEGATION_PREFIX.to_vec();
            code.resize(len.max(3), 0);
            code.truncate(len);
            let det = detect(&code);
            assert_ne!(det.rule, Some(DelegationRule::Canonical));
        }
    }

    #[test]
    fn detection_is_idempotent() {
        let code = canonical(Address::repeat_byte(0x42));
        assert_eq!(detect(&code), detect(&code));
    }
}
