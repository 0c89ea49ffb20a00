/*!
 * Sentinela RPC
 *
 * Cliente JSON-RPC para a testnet Monad com suporte a transações EIP-7702
 */

mod wire;

use async_trait::async_trait;
use ethereum_types::{Address, U256, U64};
use lru::LruCache;
use parking_lot::Mutex;
use sentinela_core::{
    config::{SentinelaConfig, DEFAULT_RPC_URL},
    error::{Error, Result},
    traits::{ChainDataAccessor, TransactionSubmitter},
    utils::gwei,
    BlockInfo, CallRequest, FeeData, ReceiptInfo, TransactionHash, TransactionInfo,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{debug, warn};
use web3::{
    transports::{Http, WebSocket},
    Transport, Web3,
};

use wire::{address_value, bytes_value, call_object, quantity, RpcBlock, RpcReceipt, RpcTransaction};

/// Gorjeta usada quando o node não expõe `eth_maxPriorityFeePerGas` (1 gwei)
const DEFAULT_PRIORITY_FEE_GWEI: u64 = 1;

/// Configuração do cliente RPC
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    /// Timeout de cada requisição HTTP
    pub timeout: Duration,
    pub use_cache: bool,
    /// Entradas por cache (transações, recibos e blocos)
    pub cache_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RPC_URL.to_string(),
            timeout: Duration::from_secs(30),
            use_cache: true,
            cache_size: 1024,
        }
    }
}

impl RpcConfig {
    /// Usa o endpoint da configuração geral
    pub fn from_settings(settings: &SentinelaConfig) -> Self {
        Self {
            endpoint: settings.rpc_url.clone(),
            ..Self::default()
        }
    }
}

/// Enum para diferentes tipos de transporte
pub enum TransportType {
    Http(Web3<Http>),
    WebSocket(Web3<WebSocket>),
}

/// Caches de consultas imutáveis
struct LookupCache {
    transactions: LruCache<TransactionHash, TransactionInfo>,
    receipts: LruCache<TransactionHash, ReceiptInfo>,
    blocks: LruCache<u64, BlockInfo>,
}

/// Estatísticas do cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub transactions: usize,
    pub receipts: usize,
    pub blocks: usize,
}

/// Cliente RPC da Sentinela
pub struct SentinelaRpcClient {
    transport: TransportType,
    config: RpcConfig,
    cache: Mutex<LookupCache>,
}

impl SentinelaRpcClient {
    /// Cria um novo cliente RPC HTTP
    pub async fn new_http(config: RpcConfig) -> Result<Self> {
        let url = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| Error::Config(format!("URL RPC inválida: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Rpc(format!("Falha ao criar cliente HTTP: {}", e)))?;

        let web3 = Web3::new(Http::with_client(client, url));

        // Verifica a conexão
        web3.eth()
            .block_number()
            .await
            .map_err(|e| Error::Rpc(format!("Falha ao conectar ao node: {}", e)))?;

        Ok(Self::with_transport(TransportType::Http(web3), config))
    }

    /// Cria um novo cliente RPC WebSocket
    pub async fn new_websocket(config: RpcConfig) -> Result<Self> {
        let transport = WebSocket::new(&config.endpoint)
            .await
            .map_err(|e| Error::Rpc(format!("Falha ao conectar via WebSocket: {}", e)))?;

        let web3 = Web3::new(transport);

        // Verifica a conexão
        web3.eth()
            .block_number()
            .await
            .map_err(|e| Error::Rpc(format!("Falha ao conectar ao node: {}", e)))?;

        Ok(Self::with_transport(TransportType::WebSocket(web3), config))
    }

    /// Cria um novo cliente baseado na URL
    pub async fn new(config: RpcConfig) -> Result<Self> {
        if config.endpoint.starts_with("ws") {
            Self::new_websocket(config).await
        } else {
            Self::new_http(config).await
        }
    }

    fn with_transport(transport: TransportType, config: RpcConfig) -> Self {
        let size = NonZeroUsize::new(config.cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            transport,
            cache: Mutex::new(LookupCache {
                transactions: LruCache::new(size),
                receipts: LruCache::new(size),
                blocks: LruCache::new(size),
            }),
            config,
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Executa uma chamada JSON-RPC crua
    async fn execute(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        debug!(method, "chamada RPC");
        let result = match &self.transport {
            TransportType::Http(web3) => web3.transport().execute(method, params).await,
            TransportType::WebSocket(web3) => web3.transport().execute(method, params).await,
        };
        result.map_err(|e| Error::Rpc(format!("{} falhou: {}", method, e)))
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let value = self.execute(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::Decode(format!("resposta inválida de {}: {}", method, e)))
    }

    /// Limpa o cache
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.transactions.clear();
        cache.receipts.clear();
        cache.blocks.clear();
    }

    /// Obtém estatísticas do cache
    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock();
        CacheStats {
            transactions: cache.transactions.len(),
            receipts: cache.receipts.len(),
            blocks: cache.blocks.len(),
        }
    }

    async fn priority_fee(&self) -> U256 {
        match self.request::<U256>("eth_maxPriorityFeePerGas", vec![]).await {
            Ok(tip) => tip,
            Err(e) => {
                debug!(error = %e, "node sem eth_maxPriorityFeePerGas, usando padrão");
                gwei(DEFAULT_PRIORITY_FEE_GWEI)
            }
        }
    }
}

#[async_trait]
impl ChainDataAccessor for SentinelaRpcClient {
    async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        let code: web3::types::Bytes = self
            .request("eth_getCode", vec![address_value(&address), Value::from("latest")])
            .await?;
        Ok(code.0)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.request("eth_getBalance", vec![address_value(&address), Value::from("latest")])
            .await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        let nonce: U256 = self
            .request(
                "eth_getTransactionCount",
                vec![address_value(&address), Value::from("latest")],
            )
            .await?;
        Ok(nonce.low_u64())
    }

    async fn get_chain_id(&self) -> Result<u64> {
        let chain_id: U64 = self.request("eth_chainId", vec![]).await?;
        Ok(chain_id.as_u64())
    }

    async fn get_fee_data(&self) -> Result<FeeData> {
        let latest: Option<RpcBlock> = self
            .request("eth_getBlockByNumber", vec![Value::from("latest"), Value::Bool(false)])
            .await?;
        let gas_price: Option<U256> = match self.request("eth_gasPrice", vec![]).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(error = %e, "falha ao obter gas price");
                None
            }
        };

        let base_fee = latest.and_then(|b| b.base_fee_per_gas);
        let fees = match base_fee {
            Some(base) => {
                let tip = self.priority_fee().await;
                FeeData {
                    gas_price,
                    max_fee_per_gas: Some(base * 2 + tip),
                    max_priority_fee_per_gas: Some(tip),
                }
            }
            None => FeeData {
                gas_price,
                max_fee_per_gas: None,
                max_priority_fee_per_gas: None,
            },
        };
        Ok(fees)
    }

    async fn get_block_number(&self) -> Result<u64> {
        let number: U64 = self.request("eth_blockNumber", vec![]).await?;
        Ok(number.as_u64())
    }

    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<TransactionInfo>> {
        if self.config.use_cache {
            let cached = self.cache.lock().transactions.get(&tx_hash).cloned();
            if cached.is_some() {
                return Ok(cached);
            }
        }

        let tx: Option<RpcTransaction> = self
            .request("eth_getTransactionByHash", vec![Value::String(format!("{:?}", tx_hash))])
            .await?;
        let tx: Option<TransactionInfo> = tx.map(Into::into);

        // pendentes ainda podem mudar de bloco
        if let Some(tx) = tx.as_ref().filter(|t| t.block_number.is_some()) {
            if self.config.use_cache {
                self.cache.lock().transactions.put(tx_hash, tx.clone());
            }
        }
        Ok(tx)
    }

    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Option<ReceiptInfo>> {
        if self.config.use_cache {
            let cached = self.cache.lock().receipts.get(&tx_hash).cloned();
            if cached.is_some() {
                return Ok(cached);
            }
        }

        let receipt: Option<RpcReceipt> = self
            .request("eth_getTransactionReceipt", vec![Value::String(format!("{:?}", tx_hash))])
            .await?;
        let receipt: Option<ReceiptInfo> = receipt.map(Into::into);

        if let Some(receipt) = &receipt {
            if self.config.use_cache {
                self.cache.lock().receipts.put(tx_hash, receipt.clone());
            }
        }
        Ok(receipt)
    }

    async fn get_block(&self, block_number: u64) -> Result<Option<BlockInfo>> {
        if self.config.use_cache {
            let cached = self.cache.lock().blocks.get(&block_number).cloned();
            if cached.is_some() {
                return Ok(cached);
            }
        }

        let block: Option<RpcBlock> = self
            .request("eth_getBlockByNumber", vec![quantity(block_number), Value::Bool(false)])
            .await?;
        let block = block.map(|b| b.into_info(block_number));

        if let Some(block) = &block {
            if self.config.use_cache {
                self.cache.lock().blocks.put(block_number, block.clone());
            }
        }
        Ok(block)
    }
}

#[async_trait]
impl TransactionSubmitter for SentinelaRpcClient {
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>> {
        let output: web3::types::Bytes = self
            .request("eth_call", vec![call_object(request), Value::from("latest")])
            .await?;
        Ok(output.0)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<U256> {
        self.request("eth_estimateGas", vec![call_object(request)]).await
    }

    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TransactionHash> {
        self.request("eth_sendRawTransaction", vec![bytes_value(&raw)]).await
    }
}
