use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sentinela_core::{
    config::AlertConfig, error::Result, traits::AlertSink, MaliciousRegistry, ThreatAlert,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Estatísticas expostas a consumidores externos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total_threats: u64,
    pub total_scans: u64,
    pub active_monitoring: usize,
    pub known_malicious_contracts: usize,
    pub last_updated: DateTime<Utc>,
}

struct StoreState {
    alerts: VecDeque<ThreatAlert>,
    total_threats: u64,
    total_scans: u64,
    active_monitoring: usize,
    last_updated: DateTime<Utc>,
}

/// Alertas recentes em memória, do mais novo para o mais antigo.
///
/// Ao passar da capacidade o alerta mais antigo é descartado; os contadores
/// continuam acumulando.
pub struct AlertStore {
    capacity: usize,
    known_malicious: usize,
    state: Mutex<StoreState>,
}

impl AlertStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            known_malicious: MaliciousRegistry::global().len(),
            state: Mutex::new(StoreState {
                alerts: VecDeque::with_capacity(capacity),
                total_threats: 0,
                total_scans: 0,
                active_monitoring: 0,
                last_updated: Utc::now(),
            }),
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Usa o tamanho de outro registro nas estatísticas
    pub fn with_registry(mut self, registry: &MaliciousRegistry) -> Self {
        self.known_malicious = registry.len();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adiciona um alerta no topo
    pub fn add(&self, alert: ThreatAlert) {
        let mut state = self.state.lock();
        debug!(id = %alert.id, severity = ?alert.severity, "alerta armazenado");
        state.alerts.push_front(alert);
        state.alerts.truncate(self.capacity);
        state.total_threats += 1;
        state.last_updated = Utc::now();
    }

    /// Até `limit` alertas mais recentes
    pub fn recent(&self, limit: usize) -> Vec<ThreatAlert> {
        self.state.lock().alerts.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().alerts.is_empty()
    }

    pub fn increment_scans(&self) {
        let mut state = self.state.lock();
        state.total_scans += 1;
        state.last_updated = Utc::now();
    }

    pub fn set_active(&self, count: usize) {
        let mut state = self.state.lock();
        state.active_monitoring = count;
        state.last_updated = Utc::now();
    }

    pub fn stats(&self) -> StatsReport {
        let state = self.state.lock();
        StatsReport {
            total_threats: state.total_threats,
            total_scans: state.total_scans,
            active_monitoring: state.active_monitoring,
            known_malicious_contracts: self.known_malicious,
            last_updated: state.last_updated,
        }
    }

    /// Remove os alertas armazenados sem zerar os contadores
    pub fn clear(&self) {
        self.state.lock().alerts.clear();
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}

#[async_trait]
impl AlertSink for AlertStore {
    async fn publish(&self, alert: ThreatAlert) -> Result<()> {
        self.add(alert);
        Ok(())
    }

    async fn record_scan(&self) {
        self.increment_scans();
    }

    async fn set_active_monitoring(&self, count: usize) {
        self.set_active(count);
    }
}
