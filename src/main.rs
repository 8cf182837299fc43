use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use pod_reaper::{
    credential_source, ensure_namespaces, load_config, Args, KubeClusterClient, Reaper,
    SystemEnvironment,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("Hello from pod reaper! Hide all the pods!");

    let args = Args::parse();
    let cfg = load_config().context("invalid configuration")?;
    info!(
        "namespaces = {:?}, max deletions per run = {}, single pass = {}",
        cfg.namespaces, cfg.max_deletions_per_run, cfg.run_once
    );
    if !cfg.reap_evicted {
        debug!("REAP_EVICTED_PODS not set. Not reaping evicted pods.");
    }
    ensure_namespaces(&cfg).context("invalid configuration")?;

    let source = credential_source(&cfg, args.kubeconfig, &SystemEnvironment)?;
    let client = KubeClusterClient::connect(&source)
        .await
        .context("failed to set up cluster client")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let reaper = Reaper::new(client, cfg);
    reaper.run(shutdown_rx).await.context("pod reaper stopped")
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
