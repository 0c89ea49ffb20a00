use std::env;
use std::sync::Arc;

use ethers::signers::{LocalWallet, Signer};
use sentinela_core::config::SentinelaConfig;
use sentinela_remediation::{CancellationOptions, DelegationCanceller, SafetyChecker};
use sentinela_rpc::{RpcConfig, SentinelaRpcClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // A chave vem do ambiente para não aparecer no histórico do shell
    let key = env::var("SENTINELA_PRIVATE_KEY")
        .map_err(|_| anyhow::anyhow!("defina SENTINELA_PRIVATE_KEY"))?;
    let wallet: LocalWallet = key.parse()?;
    let live = env::args().any(|a| a == "--live");

    let settings = SentinelaConfig::from_env()?;
    let client = Arc::new(SentinelaRpcClient::new(RpcConfig::from_settings(&settings)).await?);

    let checker = SafetyChecker::new(client.clone(), settings.preflight.clone());
    let report = checker.check(wallet.address()).await;
    for warning in &report.warnings {
        println!("⚠️  {warning}");
    }
    for suggestion in &report.suggestions {
        println!("💡 {suggestion}");
    }

    let canceller = DelegationCanceller::new(client.clone(), settings.remediation.clone());
    let eligibility = canceller.can_cancel(wallet.address()).await;
    if !eligibility.can_cancel {
        println!("Cancelamento indisponível: {}", eligibility.reason.unwrap_or_default());
        return Ok(());
    }

    let options = CancellationOptions {
        dry_run: !live,
        ..Default::default()
    };
    let result = canceller.cancel(&wallet, &options).await;
    println!("Etapa: {:?} | sucesso: {}", result.stage, result.success);
    if let Some(hash) = result.transaction_hash {
        println!("Transação: {hash:?}");
    }
    if let Some(error) = result.error {
        println!("Erro: {error}");
    }

    if live && result.success {
        let verification = canceller.verify_cancellation(wallet.address()).await;
        println!("Delegação removida: {}", verification.is_cleared);
    }

    Ok(())
}
