use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_local_env_overrides};
use learning_journal::load_config;

pub async fn run() -> Result<()> {
    let local_env = load_local_env_overrides();
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;
    local_env.log();
    info!("Starting learning journal v{}", env!("CARGO_PKG_VERSION"));

    let loaded = load_config(cli.config.as_deref()).await?;

    match dispatch(&cli, loaded).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
