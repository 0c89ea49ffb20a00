use ethereum_types::Address;
use sentinela_core::{
    error::{Error, Result},
    traits::ChainDataAccessor,
    utils::function_selector,
    AlertEvidence, AlertSeverity, MaliciousRegistry, ThreatAlert, TransactionHash,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bytecode_rules::scan_target_code;

/// Classificação de uma transação suspeita
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxAttackKind {
    SetCodeDelegation,
    MaliciousAuthorization,
    TokenApproval,
    NftApproval,
    KnownAttackSignature,
    MaliciousRecipient,
    AssetMovingContract,
}

/// Resultado da inspeção de uma transação
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInspection {
    pub tx_hash: TransactionHash,
    pub found: bool,
    pub is_attack: bool,
    pub attack_kinds: Vec<TxAttackKind>,
    pub evidence: Vec<String>,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub authorization_targets: Vec<Address>,
    pub status: Option<u64>,
    pub block_number: Option<u64>,
    pub block_timestamp: Option<u64>,
}

impl TxInspection {
    fn empty(tx_hash: TransactionHash) -> Self {
        Self {
            tx_hash,
            found: false,
            is_attack: false,
            attack_kinds: Vec::new(),
            evidence: Vec::new(),
            from: None,
            to: None,
            authorization_targets: Vec::new(),
            status: None,
            block_number: None,
            block_timestamp: None,
        }
    }

    fn flag(&mut self, kind: TxAttackKind, evidence: String) {
        self.is_attack = true;
        if !self.attack_kinds.contains(&kind) {
            self.attack_kinds.push(kind);
        }
        self.evidence.push(evidence);
    }

    fn read_failed(&mut self, what: &str, error: &Error) {
        warn!(tx_hash = ?self.tx_hash, error = %error, "leitura parcial falhou: {}", what);
        self.evidence.push(format!("Failed to read {}: {}", what, error));
    }

    /// Severidade sugerida; envolvimento de endereço do registro é crítico
    pub fn severity(&self) -> AlertSeverity {
        let critical = self.attack_kinds.iter().any(|k| {
            matches!(
                k,
                TxAttackKind::MaliciousAuthorization | TxAttackKind::MaliciousRecipient
            )
        });
        if critical {
            AlertSeverity::Critical
        } else if self.is_attack {
            AlertSeverity::High
        } else {
            AlertSeverity::Low
        }
    }

    /// Converte a inspeção em alerta quando há ataque
    pub fn to_alert(&self) -> Option<ThreatAlert> {
        if !self.is_attack {
            return None;
        }
        let description = format!(
            "Suspicious transaction {:?}: {}",
            self.tx_hash,
            self.evidence.join(", ")
        );
        Some(ThreatAlert::new(
            self.from.unwrap_or_default(),
            self.severity(),
            description,
            AlertEvidence::MaliciousContract {
                transaction_hash: self.tx_hash,
                block_number: self.block_number,
                to: self.to,
            },
        ))
    }
}

/// Analisa transações individuais em busca de padrões de ataque
pub struct TxInspector<C> {
    accessor: Arc<C>,
    registry: MaliciousRegistry,
    selectors: HashMap<[u8; 4], (TxAttackKind, &'static str)>,
}

impl<C> TxInspector<C> {
    pub fn new(accessor: Arc<C>) -> Self {
        let mut selectors = HashMap::new();
        selectors.insert(
            function_selector("approve(address,uint256)"),
            (TxAttackKind::TokenApproval, "contains token approval signature"),
        );
        selectors.insert(
            function_selector("setApprovalForAll(address,bool)"),
            (TxAttackKind::NftApproval, "contains setApprovalForAll signature"),
        );
        selectors.insert(
            [0x9e, 0x9b, 0xdb, 0x28],
            (TxAttackKind::KnownAttackSignature, "NFT verification scam signature"),
        );
        selectors.insert(
            [0x81, 0x29, 0xfc, 0x1c],
            (TxAttackKind::KnownAttackSignature, "multicall delegation signature"),
        );

        Self {
            accessor,
            registry: MaliciousRegistry::global().clone(),
            selectors,
        }
    }

    pub fn with_registry(mut self, registry: MaliciousRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl<C: ChainDataAccessor> TxInspector<C> {
    /// Inspeciona uma transação. Falhas viram evidência, nunca erro.
    ///
    /// Leituras que falham depois da transação não descartam as marcações já feitas.
    pub async fn inspect(&self, tx_hash: TransactionHash) -> TxInspection {
        match self.try_inspect(tx_hash).await {
            Ok(inspection) => inspection,
            Err(e) => {
                warn!(tx_hash = ?tx_hash, error = %e, "falha ao inspecionar transação");
                let mut inspection = TxInspection::empty(tx_hash);
                inspection.evidence.push(format!("Analysis failed: {}", e));
                inspection
            }
        }
    }

    /// Só a leitura da própria transação propaga erro
    async fn try_inspect(&self, tx_hash: TransactionHash) -> Result<TxInspection> {
        let mut inspection = TxInspection::empty(tx_hash);

        let tx = match self.accessor.get_transaction(tx_hash).await? {
            Some(tx) => tx,
            None => {
                inspection.evidence.push("Transaction not found".to_string());
                return Ok(inspection);
            }
        };
        inspection.found = true;
        inspection.from = Some(tx.from);
        inspection.to = tx.to;
        inspection.block_number = tx.block_number;

        if tx.is_set_code() {
            inspection.flag(
                TxAttackKind::SetCodeDelegation,
                "EIP-7702 delegation transaction detected".to_string(),
            );
        }
        for auth in &tx.authorization_list {
            inspection.authorization_targets.push(auth.address);
            if self.registry.contains(&auth.address) {
                inspection.flag(
                    TxAttackKind::MaliciousAuthorization,
                    format!("authorization delegates to known malicious contract {:?}", auth.address),
                );
            }
        }

        if tx.input.len() >= 4 {
            let selector = [tx.input[0], tx.input[1], tx.input[2], tx.input[3]];
            if let Some((kind, evidence)) = self.selectors.get(&selector) {
                inspection.flag(*kind, evidence.to_string());
            }
        }

        if let Some(to) = tx.to {
            if self.registry.contains(&to) {
                inspection.flag(
                    TxAttackKind::MaliciousRecipient,
                    format!("interaction with known malicious contract {:?}", to),
                );
            }
            match self.accessor.get_code(to).await {
                Ok(code) if !code.is_empty() => {
                    inspection.evidence.push(format!("interacted with contract {:?}", to));
                    if scan_target_code(&code).iter().any(|r| r.moves_assets()) {
                        inspection.flag(
                            TxAttackKind::AssetMovingContract,
                            "contract can transfer tokens/NFTs".to_string(),
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => inspection.read_failed("recipient code", &e),
            }
        }

        match self.accessor.get_transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => {
                inspection.status = receipt.status;
                inspection.block_number = receipt.block_number.or(inspection.block_number);
            }
            Ok(None) => {}
            Err(e) => inspection.read_failed("receipt", &e),
        }
        if let Some(number) = inspection.block_number {
            match self.accessor.get_block(number).await {
                Ok(block) => inspection.block_timestamp = block.map(|b| b.timestamp),
                Err(e) => inspection.read_failed("block", &e),
            }
        }

        debug!(
            tx_hash = ?tx_hash,
            attack = inspection.is_attack,
            kinds = inspection.attack_kinds.len(),
            "transação inspecionada"
        );
        Ok(inspection)
    }

    /// Inspeciona e devolve erro quando a transação não existe
    pub async fn inspect_existing(&self, tx_hash: TransactionHash) -> Result<TxInspection> {
        let inspection = self.try_inspect(tx_hash).await?;
        if !inspection.found {
            return Err(Error::NotFound(format!("transação {:?}", tx_hash)));
        }
        Ok(inspection)
    }
}
