use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOCAL_ENV_PATH: &str = "config/local.env";

/// Outcome of reading `config/local.env`, logged once tracing is up.
#[derive(Debug, Default)]
pub struct LocalEnvReport {
    path: PathBuf,
    found: bool,
    applied: Vec<String>,
    invalid_lines: Vec<usize>,
    read_error: Option<io::Error>,
}

impl LocalEnvReport {
    pub fn log(&self) {
        if let Some(err) = &self.read_error {
            warn!(path = %self.path.display(), ?err, "failed to read local.env overrides");
            return;
        }
        if !self.found {
            return;
        }
        for line in &self.invalid_lines {
            warn!(line, "invalid local.env entry; skipping");
        }
        info!(
            path = %self.path.display(),
            applied = ?self.applied,
            "Loaded environment overrides from local.env"
        );
    }
}

/// Copies `KEY=value` lines from `config/local.env` into the environment.
/// Variables that are already set keep their value.
pub fn load_local_env_overrides() -> LocalEnvReport {
    load_env_file(Path::new(LOCAL_ENV_PATH))
}

fn load_env_file(path: &Path) -> LocalEnvReport {
    let mut report = LocalEnvReport {
        path: path.to_path_buf(),
        ..LocalEnvReport::default()
    };
    if !path.exists() {
        return report;
    }
    report.found = true;

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            report.read_error = Some(err);
            return report;
        }
    };
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            report.invalid_lines.push(idx + 1);
            continue;
        };
        let key = key.trim();
        if key.is_empty() || env::var(key).is_ok() {
            continue;
        }
        env::set_var(key, unquote(value.trim()));
        report.applied.push(key.to_string());
    }
    report
}

/// Logs go to stderr so they never interleave with the interactive menu.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\t", "\t")
    } else {
        value.to_string()
    }
}
