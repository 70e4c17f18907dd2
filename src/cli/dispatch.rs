use anyhow::Result;

use super::commands::Commands;
use super::env::CliArgs;
use super::info::cmd_info;
use super::manage::cmd_manage;
use super::serve::cmd_serve;
use learning_journal::LoadedConfig;

pub async fn dispatch(cli: &CliArgs, loaded: LoadedConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Serve(args) => cmd_serve(args, loaded.config).await,
        Commands::Manage => cmd_manage(loaded.config).await,
        Commands::Info(args) => cmd_info(args, &loaded).await,
    }
}
