use std::env;
use std::sync::Arc;

use sentinela_core::{config::SentinelaConfig, utils::{format_ether, parse_address}};
use sentinela_detector::{RiskClassifier, ThreatAssessor, WalletInspector};
use sentinela_rpc::{RpcConfig, SentinelaRpcClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: {} <ENDEREÇO> [RPC_ENDPOINT]", args[0]);
        std::process::exit(1);
    }

    // Endereço inválido é rejeitado antes de conectar
    let address = parse_address(&args[1])?;

    let mut settings = SentinelaConfig::from_env()?;
    if let Some(endpoint) = args.get(2) {
        settings.rpc_url = endpoint.clone();
    }

    let client = Arc::new(SentinelaRpcClient::new(RpcConfig::from_settings(&settings)).await?);
    let inspector = WalletInspector::new(client.clone(), RiskClassifier::new(settings.risk.clone()));
    let assessor = ThreatAssessor::new(client.clone(), settings.assessor.clone())
        .with_chain_id(settings.preflight.expected_chain_id);

    println!("🔍 Inspecionando {address:?}...");
    let status = inspector.inspect(address).await?;
    println!("Saldo: {} MON | nonce: {}", format_ether(&status.balance), status.nonce);

    let record = &status.delegation;
    match record.delegated_to {
        Some(target) => {
            println!("⚠️  Delegação ativa para {target:?} (risco {})", record.risk_level);
            let target_info = inspector.target_info(target).await?;
            println!("   código do alvo: {} bytes", target_info.code_size);
            for finding in &target_info.findings {
                println!("   - {}", finding.description());
            }
        }
        None => println!("✅ Nenhuma delegação detectada (risco {})", record.risk_level),
    }
    for factor in &record.risk_factors {
        println!("- {factor}");
    }

    let assessment = assessor.assess(address).await;
    println!(
        "Avaliação: {} (pontuação {}/100)",
        assessment.threat_level, assessment.safety_score
    );
    for threat in &assessment.threats {
        println!("- {}: {}", threat.description, threat.recommendation);
    }

    Ok(())
}
