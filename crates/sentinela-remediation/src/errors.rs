use sentinela_core::Error;
use thiserror::Error;

/// Erros da remediação.
///
/// A mensagem é entregue ao usuário no campo `error` dos resultados.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemediationError {
    /// Leitura da chain falhou antes do envio
    #[error("Failed to read chain state: {0}")]
    Chain(#[from] Error),

    /// Falha ao assinar autorização ou transação
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Simulação rejeitada pelo node
    #[error("Dry run failed: {0}")]
    Simulation(String),

    /// Node recusou a transação assinada
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Saldo não cobre a reserva de gás
    #[error("Insufficient balance for gas fees. Balance: {balance} MON, Gas needed: {required} MON")]
    InsufficientGas { balance: String, required: String },

    /// Saldo não cobre o valor pedido mais a reserva de gás
    #[error("Insufficient balance. Need {required} MON ({amount} + gas), but only have {balance} MON")]
    InsufficientBalance {
        required: String,
        amount: String,
        balance: String,
    },

    #[error("No funds available to transfer")]
    NoFunds,

    /// Destino malformado ou inutilizável
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Resultado padrão da crate
pub type Result<T> = std::result::Result<T, RemediationError>;
