use chrono::{DateTime, Utc};
use ethereum_types::{Address, U256};
use futures::try_join;
use lru::LruCache;
use parking_lot::Mutex;
use sentinela_core::{error::Result, traits::ChainDataAccessor, AccountSnapshot, RiskLevel};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::bytecode_rules::{scan_target_code, TargetRule};
use crate::risk_classifier::{DelegationRecord, RiskClassifier};

pub const FACTOR_UNEXPECTED_CODE: &str = "account has unexpected code that may indicate delegation";

const TARGET_CODE_CACHE_SIZE: usize = 256;

/// Estado de uma carteira no momento da inspeção
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStatus {
    pub address: Address,
    pub chain_id: u64,
    pub balance: U256,
    pub nonce: u64,
    pub delegation: DelegationRecord,
    pub checked_at: DateTime<Utc>,
}

/// Informações do contrato alvo de uma delegação
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub address: Address,
    pub code_size: usize,
    pub is_contract: bool,
    pub balance: U256,
    pub findings: Vec<TargetRule>,
}

/// Inspeciona carteiras usando o classificador compartilhado
pub struct WalletInspector<C> {
    accessor: Arc<C>,
    classifier: RiskClassifier,
    code_cache: Mutex<LruCache<Address, Vec<u8>>>,
}

impl<C> WalletInspector<C> {
    pub fn new(accessor: Arc<C>, classifier: RiskClassifier) -> Self {
        Self {
            accessor,
            classifier,
            code_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(TARGET_CODE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Classificação sem acesso à rede
    pub fn inspect_snapshot(&self, snapshot: &AccountSnapshot) -> WalletStatus {
        let mut delegation = self.classifier.evaluate(snapshot);

        // código presente que nenhuma regra reconheceu
        if !snapshot.code.is_empty() && !delegation.is_delegated {
            delegation.risk_factors.push(FACTOR_UNEXPECTED_CODE.to_string());
            if delegation.risk_level == RiskLevel::Low {
                delegation.risk_level = RiskLevel::Medium;
            }
        }

        WalletStatus {
            address: snapshot.address,
            chain_id: snapshot.chain_id,
            balance: snapshot.balance,
            nonce: snapshot.nonce,
            delegation,
            checked_at: Utc::now(),
        }
    }
}

impl<C: ChainDataAccessor> WalletInspector<C> {
    /// Lê o estado da carteira e classifica a delegação
    pub async fn inspect(&self, address: Address) -> Result<WalletStatus> {
        let snapshot = AccountSnapshot::capture(self.accessor.as_ref(), address).await?;
        let status = self.inspect_snapshot(&snapshot);
        info!(
            address = ?address,
            delegated = status.delegation.is_delegated,
            risk = %status.delegation.risk_level,
            "carteira inspecionada"
        );
        Ok(status)
    }

    /// Tamanho do código, saldo e padrões do contrato alvo
    pub async fn target_info(&self, target: Address) -> Result<TargetInfo> {
        let (code, balance) = try_join!(self.target_code(target), self.accessor.get_balance(target))?;
        let findings = scan_target_code(&code);
        debug!(target = ?target, size = code.len(), findings = findings.len(), "alvo analisado");
        Ok(TargetInfo {
            address: target,
            code_size: code.len(),
            is_contract: !code.is_empty(),
            balance,
            findings,
        })
    }

    async fn target_code(&self, target: Address) -> Result<Vec<u8>> {
        {
            let mut cache = self.code_cache.lock();
            if let Some(code) = cache.get(&target) {
                return Ok(code.clone());
            }
        }

        let code = self.accessor.get_code(target).await?;
        // conta sem código ainda pode receber um deploy
        if !code.is_empty() {
            self.code_cache.lock().put(target, code.clone());
        }
        Ok(code)
    }
}
