use dashmap::DashMap;
use ethereum_types::Address;
use sentinela_core::{
    config::MonitorConfig,
    traits::{AlertSink, ChainDataAccessor},
    AlertEvidence, AlertSeverity, ThreatAlert,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::threat_assessor::{ThreatAssessment, ThreatAssessor, ThreatLevel};

/// Controle de um loop de monitoramento em execução
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Sinaliza a parada; o loop sai na próxima verificação
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Para e aguarda o término do loop
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!(error = %e, "loop de monitoramento terminou com erro");
        }
    }
}

/// Monitor periódico de carteiras.
///
/// A cada bloco novo avalia as carteiras observadas e publica um alerta
/// quando o nível é pelo menos HIGH e mudou desde o último publicado.
pub struct WalletMonitor<C> {
    accessor: Arc<C>,
    assessor: ThreatAssessor<C>,
    sink: Arc<dyn AlertSink>,
    config: MonitorConfig,
    last_levels: DashMap<Address, ThreatLevel>,
}

impl<C: ChainDataAccessor + 'static> WalletMonitor<C> {
    pub fn new(
        accessor: Arc<C>,
        assessor: ThreatAssessor<C>,
        sink: Arc<dyn AlertSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            accessor,
            assessor,
            sink,
            config,
            last_levels: DashMap::new(),
        }
    }

    /// Último nível observado de uma carteira
    pub fn last_level(&self, address: &Address) -> Option<ThreatLevel> {
        self.last_levels.get(address).map(|l| *l)
    }

    /// Avalia uma carteira e publica alerta se o nível subiu para HIGH ou mais
    pub async fn check_wallet(&self, address: Address) -> Option<ThreatAlert> {
        let assessment = self.assessor.assess(address).await;
        let level = assessment.threat_level;
        let previous = self.last_levels.insert(address, level);

        if level < ThreatLevel::High || previous == Some(level) {
            return None;
        }

        let alert = alert_from_assessment(&assessment);
        info!(address = ?address, level = %level, "ameaça detectada pelo monitor");
        if let Err(e) = self.sink.publish(alert.clone()).await {
            warn!(address = ?address, error = %e, "falha ao publicar alerta");
        }
        Some(alert)
    }

    /// Inicia o loop em uma task tokio
    pub fn spawn(self: Arc<Self>, wallets: Vec<Address>) -> MonitorHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let task = tokio::spawn(self.run(wallets, stop.clone(), wake.clone()));
        MonitorHandle { stop, wake, task }
    }

    async fn run(self: Arc<Self>, wallets: Vec<Address>, stop: Arc<AtomicBool>, wake: Arc<Notify>) {
        info!(wallets = wallets.len(), interval_ms = self.config.poll_interval_ms, "monitor iniciado");
        self.sink.set_active_monitoring(wallets.len()).await;

        let mut last_block: Option<u64> = None;
        while !stop.load(Ordering::SeqCst) {
            let pause = match self.accessor.get_block_number().await {
                Ok(block) => {
                    if last_block.map_or(true, |last| block > last) {
                        debug!(block, "verificando carteiras");
                        for address in &wallets {
                            if stop.load(Ordering::SeqCst) {
                                break;
                            }
                            self.check_wallet(*address).await;
                        }
                        last_block = Some(block);
                    }
                    self.config.poll_interval()
                }
                Err(e) => {
                    warn!(error = %e, "erro no monitoramento");
                    self.config.error_backoff()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = wake.notified() => {}
            }
        }

        self.sink.set_active_monitoring(0).await;
        info!("monitor parado");
    }
}

/// Constrói o alerta publicado pelo monitor
pub fn alert_from_assessment(assessment: &ThreatAssessment) -> ThreatAlert {
    let descriptions: Vec<String> = assessment
        .threats
        .iter()
        .map(|t| t.description.clone())
        .collect();

    let evidence = match (assessment.delegated_to, assessment.code_hash) {
        (Some(target), Some(code_hash)) => AlertEvidence::DelegationAttack {
            delegated_to: Some(target),
            code_hash,
            balance: assessment.balance.unwrap_or_default(),
            risk_factors: descriptions.clone(),
        },
        _ => AlertEvidence::SuspiciousActivity {
            nonce: assessment.nonce.unwrap_or_default(),
            notes: descriptions.clone(),
        },
    };

    ThreatAlert::new(
        assessment.address,
        AlertSeverity::from(assessment.threat_level),
        descriptions.join("; "),
        evidence,
    )
}
