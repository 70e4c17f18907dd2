use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::warn;

use super::state::ServeState;

/// Both collections must be readable and their directory writable.
pub async fn run_startup_readiness_checks(state: &ServeState) -> Result<()> {
    let state = state.clone();
    tokio::task::spawn_blocking(move || check_collections(&state))
        .await
        .context("readiness check task panicked")?
}

fn check_collections(state: &ServeState) -> Result<()> {
    for path in [
        state.reflections.store().path(),
        state.scores.store().path(),
    ] {
        ensure_writable_dir(path.parent().unwrap_or_else(|| Path::new(".")))?;
    }
    state
        .reflections
        .list()
        .context("reflections collection is unreadable")?;
    state
        .scores
        .list()
        .context("snake score collection is unreadable")?;

    if !state.templates_dir().is_dir() {
        warn!(
            dir = %state.templates_dir().display(),
            "templates directory missing; page routes will answer 404"
        );
    }
    Ok(())
}

fn ensure_writable_dir(dir: &Path) -> Result<()> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to prepare data directory {}", dir.display()))?;
    NamedTempFile::new_in(dir)
        .with_context(|| format!("data directory {} is not writable", dir.display()))?;
    Ok(())
}
