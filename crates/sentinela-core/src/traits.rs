/*!
 * Sentinela Traits
 *
 * Colaboradores externos usados pelo núcleo de detecção e remediação
 */

use async_trait::async_trait;
use ethereum_types::{Address, U256};

use crate::alert::ThreatAlert;
use crate::error::Result;
use crate::types::{
    BlockInfo, CallRequest, FeeData, ReceiptInfo, TransactionHash, TransactionInfo,
};

/// Acesso somente leitura aos dados da chain.
///
/// Cada chamada é uma operação remota única; o núcleo não faz retries.
#[async_trait]
pub trait ChainDataAccessor: Send + Sync {
    /// Obtém o código de uma conta
    async fn get_code(&self, address: Address) -> Result<Vec<u8>>;

    /// Obtém o saldo em wei
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Obtém o nonce da conta
    async fn get_transaction_count(&self, address: Address) -> Result<u64>;

    /// Obtém o chain id da rede conectada
    async fn get_chain_id(&self) -> Result<u64>;

    /// Obtém a estimativa de taxas atual
    async fn get_fee_data(&self) -> Result<FeeData>;

    /// Obtém o número do bloco atual
    async fn get_block_number(&self) -> Result<u64>;

    /// Obtém uma transação pelo hash
    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<TransactionInfo>>;

    /// Obtém o recibo de uma transação
    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Option<ReceiptInfo>>;

    /// Obtém um bloco pelo número
    async fn get_block(&self, block_number: u64) -> Result<Option<BlockInfo>>;
}

/// Simulação e envio de transações
#[async_trait]
pub trait TransactionSubmitter: ChainDataAccessor {
    /// Executa `eth_call` sem alterar estado
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>>;

    /// Estima o gás de uma requisição
    async fn estimate_gas(&self, request: &CallRequest) -> Result<U256>;

    /// Envia uma transação já assinada
    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TransactionHash>;
}

/// Destino de alertas de ameaça. Não há garantia de entrega.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Publica um alerta
    async fn publish(&self, alert: ThreatAlert) -> Result<()>;

    /// Registra que uma varredura foi feita
    async fn record_scan(&self) {}

    /// Informa quantas carteiras estão sob monitoramento
    async fn set_active_monitoring(&self, _count: usize) {}
}
