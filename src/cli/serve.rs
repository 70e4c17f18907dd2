use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use learning_journal::server::{build_journal_router, run_startup_readiness_checks, ServeState};
use learning_journal::{metrics, JournalConfig};

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Address to bind (defaults to the configured host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (defaults to the configured port)
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn cmd_serve(args: ServeArgs, mut config: JournalConfig) -> Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    metrics::register_metrics();
    let state = ServeState::from_config(&config);
    state.mark_live();
    match run_startup_readiness_checks(&state).await {
        Ok(()) => {
            state.mark_ready();
            info!("Serve readiness checks passed");
        }
        Err(err) => {
            state.mark_unready(format!("{err:#}"));
            error!(?err, "Serve readiness checks failed");
        }
    }

    let router = build_journal_router().with_state(state);
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind journal server on {}:{}",
                config.host, config.port
            )
        })?;
    let addr: SocketAddr = listener
        .local_addr()
        .context("failed to read bound address")?;

    info!(
        data_dir = %config.data_dir.display(),
        site_dir = %config.site_dir.display(),
        corrupt_policy = %config.corrupt_policy,
        "Journal available at http://{}",
        addr
    );
    if !addr.ip().is_loopback() {
        warn!("Journal API has no authentication; do not expose this port publicly");
    }

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("journal server exited unexpectedly")?;
    info!("Journal server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
