use async_trait::async_trait;
use reqwest::Client;
use sentinela_core::{config::AlertConfig, error::Error, traits::AlertSink, ThreatAlert};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Tipo de erro retornado pelo webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("erro ao enviar alerta: {0}")]
    Request(#[from] reqwest::Error),
}

/// Envia cada alerta como JSON para um endpoint HTTP.
pub struct WebhookAlertSink {
    endpoint: String,
    client: Client,
}

impl WebhookAlertSink {
    /// Cria uma nova instância apontando para `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    /// Igual a `new`, com timeout por requisição.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, WebhookError> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Webhook configurado, se houver
    pub fn from_config(config: &AlertConfig) -> Option<Self> {
        config.webhook_url.as_ref().map(Self::new)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Envia um alerta.
    pub async fn send(&self, alert: &ThreatAlert) -> Result<(), WebhookError> {
        self.client
            .post(&self.endpoint)
            .json(alert)
            .send()
            .await?
            .error_for_status()?;
        debug!(id = %alert.id, endpoint = %self.endpoint, "alerta enviado");
        Ok(())
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn publish(&self, alert: ThreatAlert) -> sentinela_core::Result<()> {
        self.send(&alert).await.map_err(|e| {
            warn!(id = %alert.id, error = %e, "webhook recusou o alerta");
            Error::Other(e.to_string())
        })
    }
}
