//! Configuration management module
//!
//! Settings come from a YAML file, then `JOURNAL_*` environment overrides.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use journal_record_store::{
    CorruptPolicy, Leaderboard, ReflectionBook, MAX_SCORES, REFLECTIONS_FILE, SNAKE_SCORES_FILE,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DATA_DIR_ENV: &str = "JOURNAL_DATA_DIR";
pub const SITE_DIR_ENV: &str = "JOURNAL_SITE_DIR";
pub const PORT_ENV: &str = "JOURNAL_PORT";
pub const CORRUPT_POLICY_ENV: &str = "JOURNAL_CORRUPT_POLICY";

const LOCAL_CONFIG_PATH: &str = "config/config.yaml";
const CONFIG_DIR_NAME: &str = "journal";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Directory holding `reflections.json` and `snake_scores.json`.
    pub data_dir: PathBuf,
    /// Directory holding `templates/` and `static/`.
    pub site_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub corrupt_policy: CorruptPolicy,
    pub max_scores: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("backend"),
            site_dir: PathBuf::from("site"),
            host: "127.0.0.1".to_string(),
            port: 5000,
            corrupt_policy: CorruptPolicy::Lenient,
            max_scores: MAX_SCORES,
        }
    }
}

impl JournalConfig {
    pub fn reflections_path(&self) -> PathBuf {
        self.data_dir.join(REFLECTIONS_FILE)
    }

    pub fn snake_scores_path(&self) -> PathBuf {
        self.data_dir.join(SNAKE_SCORES_FILE)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.site_dir.join("templates")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.site_dir.join("static")
    }

    pub fn reflection_book(&self) -> ReflectionBook {
        ReflectionBook::new(self.reflections_path()).with_policy(self.corrupt_policy)
    }

    pub fn leaderboard(&self) -> Leaderboard {
        Leaderboard::new(self.snake_scores_path())
            .with_policy(self.corrupt_policy)
            .with_capacity(self.max_scores)
    }

    /// Applies `JOURNAL_*` variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var(SITE_DIR_ENV) {
            self.site_dir = PathBuf::from(dir);
        }
        if let Ok(port) = env::var(PORT_ENV) {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(err) => warn!(value = %port, ?err, "ignoring invalid {PORT_ENV}"),
            }
        }
        if let Ok(policy) = env::var(CORRUPT_POLICY_ENV) {
            match policy.parse::<CorruptPolicy>() {
                Ok(policy) => self.corrupt_policy = policy,
                Err(err) => warn!(%err, "ignoring invalid {CORRUPT_POLICY_ENV}"),
            }
        }
    }
}

pub struct LoadedConfig {
    pub config: JournalConfig,
    pub path: PathBuf,
    pub from_file: bool,
}

/// Priority: explicit path > ./config/config.yaml > ~/.config/journal/config.yaml.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG_PATH);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|mut path| {
        path.push(CONFIG_DIR_NAME);
        path.push("config.yaml");
        path
    })
}

pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = resolve_config_path(explicit).unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_PATH));

    let (mut config, from_file) = if path.exists() {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = parse_config(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from: {}", path.display());
        (config, true)
    } else {
        if explicit.is_some() {
            anyhow::bail!("config file {} does not exist", path.display());
        }
        warn!("Config file not found, using defaults: {}", path.display());
        (JournalConfig::default(), false)
    };

    config.apply_env_overrides();
    Ok(LoadedConfig {
        config,
        path,
        from_file,
    })
}

pub fn parse_config(content: &str) -> Result<JournalConfig> {
    if content.trim().is_empty() {
        return Ok(JournalConfig::default());
    }
    serde_yaml::from_str(content).context("invalid journal configuration")
}
