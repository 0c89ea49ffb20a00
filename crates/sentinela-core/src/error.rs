use thiserror::Error;

/// Erros comuns da biblioteca Sentinela
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Erro de comunicação com o node
    #[error("Erro de RPC: {0}")]
    Rpc(String),

    /// Erro de decodificação de dados
    #[error("Erro de decodificação: {0}")]
    Decode(String),

    /// Endereço malformado, rejeitado antes de qualquer chamada remota
    #[error("Endereço inválido: {0}")]
    InvalidAddress(String),

    /// Erro de validação
    #[error("Erro de validação: {0}")]
    Validation(String),

    /// Recurso não encontrado
    #[error("Não encontrado: {0}")]
    NotFound(String),

    /// Falha ao assinar autorização ou transação
    #[error("Erro de assinatura: {0}")]
    Signing(String),

    /// Configuração inválida
    #[error("Erro de configuração: {0}")]
    Config(String),

    /// Erro genérico
    #[error("{0}")]
    Other(String),
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;
