use async_trait::async_trait;
use sentinela_core::{error::Result, traits::AlertSink, ThreatAlert};
use std::sync::Arc;
use tracing::warn;

/// Repassa cada alerta e contador para vários destinos.
///
/// Todos os destinos recebem o alerta mesmo que algum falhe; o último erro
/// é devolvido.
#[derive(Default)]
pub struct AlertFanout {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl AlertFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl AlertSink for AlertFanout {
    async fn publish(&self, alert: ThreatAlert) -> Result<()> {
        let mut outcome = Ok(());
        for sink in &self.sinks {
            if let Err(e) = sink.publish(alert.clone()).await {
                warn!(id = %alert.id, error = %e, "destino de alerta falhou");
                outcome = Err(e);
            }
        }
        outcome
    }

    async fn record_scan(&self) {
        for sink in &self.sinks {
            sink.record_scan().await;
        }
    }

    async fn set_active_monitoring(&self, count: usize) {
        for sink in &self.sinks {
            sink.set_active_monitoring(count).await;
        }
    }
}
