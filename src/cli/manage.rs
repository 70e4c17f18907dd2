use std::io;

use anyhow::{Context, Result};
use tracing::info;

use learning_journal::{ConsoleManager, JournalConfig};

pub async fn cmd_manage(config: JournalConfig) -> Result<()> {
    let book = config.reflection_book();
    info!(path = %book.store().path().display(), "Opening reflection manager");

    tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let stdout = io::stdout();
        ConsoleManager::new(book, stdin.lock(), stdout.lock()).run()
    })
    .await
    .context("reflection manager task panicked")?
    .context("reflection manager failed on terminal I/O")
}
