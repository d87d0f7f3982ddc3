use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use node_metrics::config::Cli;
use node_metrics::config::Commands;
use node_metrics::config::DaemonArgs;
use node_metrics::k8s::kube_client::init_kube_client;
use node_metrics::k8s::NodeInfoCache;
use node_metrics::logging;
use node_metrics::metrics::run_metrics;
use tokio_util::sync::CancellationToken;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon(daemon_args) => run_daemon(*daemon_args).await,
    }
}

async fn run_daemon(daemon_args: DaemonArgs) -> Result<()> {
    let _guard = logging::init(&daemon_args.metrics_file);

    tracing::info!("Starting node metrics daemon {}", &**version::VERSION);

    let client = init_kube_client(daemon_args.kubeconfig.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize Kubernetes client: {e:?}"))?;

    let cache = Arc::new(NodeInfoCache::new(client, daemon_args.watch_config()));
    let cancellation_token = CancellationToken::new();

    let cache_task = {
        let cache = cache.clone();
        let token = cancellation_token.clone();
        tokio::spawn(async move { cache.run(token).await })
    };
    let metrics_task = tokio::spawn(run_metrics(
        cache.clone(),
        daemon_args.metrics_config(),
        cancellation_token.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal, stopping...");
    cancellation_token.cancel();

    if let Err(e) = cache_task.await? {
        tracing::error!("Node info cache stopped with error: {e:?}");
    }
    metrics_task.await?;

    tracing::info!("Node metrics daemon stopped");
    Ok(())
}
