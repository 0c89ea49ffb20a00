use once_cell::sync::Lazy;
use sentinela_core::utils::function_selector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefixo do proxy mínimo EIP-1167
const MINIMAL_PROXY: [u8; 10] = [0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d, 0x73];

/// `PUSH32` do slot de implementação EIP-1967
const EIP1967_SLOT_PUSH: [u8; 33] = [
    0x7f, 0x36, 0x08, 0x94, 0xa1, 0x3b, 0xa1, 0xa3, 0x21, 0x06, 0x67, 0xc8, 0x28, 0x49, 0x2d, 0xb9,
    0x8d, 0xca, 0x3e, 0x20, 0x76, 0xcc, 0x37, 0x35, 0xa9, 0x20, 0xa3, 0xca, 0x50, 0x5d, 0x38, 0x2b,
    0xbc,
];

/// Seletores procurados no código, por regra
static RULE_SELECTORS: Lazy<HashMap<TargetRule, [u8; 4]>> = Lazy::new(|| {
    [
        (TargetRule::Erc20Transfer, "transfer(address,uint256)"),
        (TargetRule::Erc20TransferFrom, "transferFrom(address,address,uint256)"),
        (TargetRule::NftSafeTransferFrom, "safeTransferFrom(address,address,uint256)"),
        (TargetRule::TransferOwnership, "transferOwnership(address)"),
    ]
    .into_iter()
    .map(|(rule, signature)| (rule, function_selector(signature)))
    .collect()
});

const OP_PUSH1: u8 = 0x60;
const OP_PUSH32: u8 = 0x7f;
const OP_DELEGATECALL: u8 = 0xf4;
const OP_SELFDESTRUCT: u8 = 0xff;

/// Regras nomeadas sobre o código de um contrato alvo de delegação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    MinimalProxy,
    Eip1967Proxy,
    Erc20Transfer,
    Erc20TransferFrom,
    NftSafeTransferFrom,
    TransferOwnership,
    SelfDestruct,
    DelegateCall,
}

pub const TARGET_RULES: [TargetRule; 8] = [
    TargetRule::MinimalProxy,
    TargetRule::Eip1967Proxy,
    TargetRule::Erc20Transfer,
    TargetRule::Erc20TransferFrom,
    TargetRule::NftSafeTransferFrom,
    TargetRule::TransferOwnership,
    TargetRule::SelfDestruct,
    TargetRule::DelegateCall,
];

impl TargetRule {
    pub fn matches(&self, code: &[u8]) -> bool {
        match self {
            TargetRule::MinimalProxy => contains(code, &MINIMAL_PROXY),
            TargetRule::Eip1967Proxy => contains(code, &EIP1967_SLOT_PUSH),
            TargetRule::Erc20Transfer
            | TargetRule::Erc20TransferFrom
            | TargetRule::NftSafeTransferFrom
            | TargetRule::TransferOwnership => self
                .selector()
                .map(|selector| contains(code, &selector))
                .unwrap_or(false),
            TargetRule::SelfDestruct => has_opcode(code, OP_SELFDESTRUCT),
            TargetRule::DelegateCall => has_opcode(code, OP_DELEGATECALL),
        }
    }

    /// Seletor de função procurado pela regra, se ela for de seletor
    pub fn selector(&self) -> Option<[u8; 4]> {
        RULE_SELECTORS.get(self).copied()
    }

    pub fn description(&self) -> &'static str {
        match self {
            TargetRule::MinimalProxy => "minimal proxy pattern detected",
            TargetRule::Eip1967Proxy => "EIP-1967 proxy implementation slot detected",
            TargetRule::Erc20Transfer => "contract can transfer ERC-20 tokens",
            TargetRule::Erc20TransferFrom => "contract can pull approved tokens",
            TargetRule::NftSafeTransferFrom => "contract can transfer NFTs",
            TargetRule::TransferOwnership => "contract can transfer ownership",
            TargetRule::SelfDestruct => "SELFDESTRUCT opcode found - contract can be destroyed",
            TargetRule::DelegateCall => "DELEGATECALL opcode found - can execute arbitrary code",
        }
    }

    /// Regras que indicam capacidade de mover ativos de terceiros
    pub fn moves_assets(&self) -> bool {
        matches!(
            self,
            TargetRule::Erc20TransferFrom | TargetRule::NftSafeTransferFrom
        )
    }
}

/// Aplica todas as regras, na ordem, e retorna as que casaram
pub fn scan_target_code(code: &[u8]) -> Vec<TargetRule> {
    if code.is_empty() {
        return Vec::new();
    }
    TARGET_RULES
        .iter()
        .copied()
        .filter(|rule| rule.matches(code))
        .collect()
}

fn contains(code: &[u8], needle: &[u8]) -> bool {
    code.windows(needle.len()).any(|w| w == needle)
}

/// Percorre os opcodes pulando os dados de `PUSH1..PUSH32`
fn has_opcode(code: &[u8], opcode: u8) -> bool {
    let mut pc = 0usize;
    while pc < code.len() {
        let op = code[pc];
        if op == opcode {
            return true;
        }
        if (OP_PUSH1..=OP_PUSH32).contains(&op) {
            pc += (op - OP_PUSH1) as usize + 1;
        }
        pc += 1;
    }
    false
}
