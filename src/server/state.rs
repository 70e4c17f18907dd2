use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use journal_record_store::{Leaderboard, ReflectionBook};
use parking_lot::Mutex;

use crate::config::JournalConfig;

#[derive(Clone)]
pub struct ServeState {
    pub(crate) reflections: Arc<ReflectionBook>,
    pub(crate) scores: Arc<Leaderboard>,
    pub(crate) site_dir: PathBuf,
    pub(crate) health: Arc<ServeHealth>,
}

impl ServeState {
    pub fn from_config(config: &JournalConfig) -> Self {
        Self {
            reflections: Arc::new(config.reflection_book()),
            scores: Arc::new(config.leaderboard()),
            site_dir: config.site_dir.clone(),
            health: Arc::new(ServeHealth::new()),
        }
    }

    pub(crate) fn templates_dir(&self) -> PathBuf {
        self.site_dir.join("templates")
    }

    pub(crate) fn static_dir(&self) -> PathBuf {
        self.site_dir.join("static")
    }

    pub fn health_snapshot(&self) -> ServeHealthSnapshot {
        self.health.snapshot()
    }

    pub fn mark_live(&self) {
        self.health.mark_live();
    }

    pub fn mark_ready(&self) {
        self.health.mark_ready();
    }

    pub fn mark_unready(&self, error: impl Into<String>) {
        self.health.mark_unready(error);
    }
}

#[derive(Default)]
pub struct ServeHealth {
    live: AtomicBool,
    ready: AtomicBool,
    last_ready_check: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl ServeHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_live(&self) {
        self.live.store(true, Ordering::SeqCst);
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.update_last_check();
        *self.last_error.lock() = None;
    }

    pub fn mark_unready(&self, error: impl Into<String>) {
        self.ready.store(false, Ordering::SeqCst);
        self.update_last_check();
        *self.last_error.lock() = Some(error.into());
    }

    pub fn snapshot(&self) -> ServeHealthSnapshot {
        ServeHealthSnapshot {
            ready: self.ready.load(Ordering::SeqCst),
            live: self.live.load(Ordering::SeqCst),
            last_ready_check: self.last_ready_check(),
            last_error: self.last_error.lock().clone(),
        }
    }

    fn update_last_check(&self) {
        if let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) {
            self.last_ready_check
                .store(duration.as_secs(), Ordering::SeqCst);
        }
    }

    fn last_ready_check(&self) -> Option<u64> {
        match self.last_ready_check.load(Ordering::SeqCst) {
            0 => None,
            value => Some(value),
        }
    }
}

pub struct ServeHealthSnapshot {
    pub ready: bool,
    pub live: bool,
    pub last_ready_check: Option<u64>,
    pub last_error: Option<String>,
}
