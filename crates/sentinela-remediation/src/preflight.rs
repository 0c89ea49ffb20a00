use ethereum_types::{Address, U256};
use sentinela_core::{
    config::PreflightConfig,
    traits::ChainDataAccessor,
    utils::{format_ether, gwei},
};
use sentinela_detector::detect;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const WARN_LOW_BALANCE: &str =
    "Very low balance - may not have enough native tokens for gas fees";
pub const WARN_NO_DELEGATION: &str = "No delegation detected - nothing to cancel";
pub const WARN_HIGH_ACTIVITY: &str =
    "High transaction activity detected - verify this is your wallet";
pub const WARN_HIGH_FEES: &str = "High gas prices detected - consider waiting for lower fees";

/// Limites usados na validação de parâmetros de transação
const MIN_GAS_LIMIT: u64 = 21_000;
const MAX_GAS_LIMIT: u64 = 1_000_000;
const MAX_FEE_SANITY_GWEI: u64 = 1_000;

/// Resultado das verificações. `safe` só é verdadeiro sem avisos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub safe: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl SafetyReport {
    fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    fn finish(mut self) -> Self {
        self.safe = self.warnings.is_empty();
        self
    }
}

/// Parâmetros de gás informados pelo usuário
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionParams {
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Verificações feitas antes de cancelar uma delegação
pub struct SafetyChecker<C> {
    accessor: Arc<C>,
    config: PreflightConfig,
}

impl<C: ChainDataAccessor> SafetyChecker<C> {
    pub fn new(accessor: Arc<C>, config: PreflightConfig) -> Self {
        Self { accessor, config }
    }

    /// Executa todas as verificações; nunca falha.
    ///
    /// As verificações são independentes e todas acumulam avisos.
    pub async fn check(&self, address: Address) -> SafetyReport {
        let reads = futures::try_join!(
            self.accessor.get_balance(address),
            self.accessor.get_code(address),
            self.accessor.get_chain_id(),
            self.accessor.get_transaction_count(address),
            self.accessor.get_fee_data(),
        );
        let (balance, code, chain_id, nonce, fees) = match reads {
            Ok(reads) => reads,
            Err(e) => {
                warn!(address = ?address, error = %e, "verificação de segurança falhou");
                let mut report = SafetyReport::default();
                report.warn(format!("Safety check failed: {}", e));
                report.suggest("Retry the operation or check your connection");
                return report.finish();
            }
        };

        let mut report = SafetyReport::default();

        if balance < self.config.min_gas_reserve_wei {
            report.warn(WARN_LOW_BALANCE);
            report.suggest(format!(
                "Add more native tokens to cover transaction costs (balance: {} MON)",
                format_ether(&balance)
            ));
        }

        if !detect(&code).is_delegated {
            report.warn(WARN_NO_DELEGATION);
        }

        if chain_id != self.config.expected_chain_id {
            report.warn(format!(
                "Connected to chain {} but expected {}",
                chain_id, self.config.expected_chain_id
            ));
            report.suggest("Verify you are connected to the correct network");
        }

        if nonce > self.config.activity_nonce {
            report.warn(WARN_HIGH_ACTIVITY);
        }

        if fees
            .max_fee_per_gas
            .map_or(false, |fee| fee > self.config.max_fee_ceiling_wei)
        {
            report.warn(WARN_HIGH_FEES);
        }

        debug!(address = ?address, warnings = report.warnings.len(), "verificação concluída");
        report.finish()
    }
}

/// Valida parâmetros de gás informados pelo usuário
pub fn validate_transaction_params(params: &TransactionParams) -> SafetyReport {
    let mut report = SafetyReport::default();

    if let Some(gas_limit) = params.gas_limit {
        if gas_limit < U256::from(MIN_GAS_LIMIT) {
            report.warn("Gas limit too low - transaction will likely fail");
        }
        if gas_limit > U256::from(MAX_GAS_LIMIT) {
            report.warn("Gas limit very high - may waste native tokens");
        }
    }

    if let Some(max_fee) = params.max_fee_per_gas {
        if max_fee > gwei(MAX_FEE_SANITY_GWEI) {
            report.warn("Max fee per gas extremely high");
            report.suggest("Consider using a lower fee to save costs");
        }
        if params.max_priority_fee_per_gas.map_or(false, |tip| tip > max_fee) {
            report.warn("Priority fee higher than max fee - invalid configuration");
        }
    }

    report.finish()
}
