//! Learning journal library
//!
//! Exposes the server, console manager and configuration for the `journal`
//! binary and for integration testing.

pub mod config;
pub mod errors;
pub mod manager;
pub mod metrics;
pub mod server;

pub use config::{load_config, JournalConfig, LoadedConfig};
pub use errors::{JournalError, JournalResult};
pub use manager::{ConsoleManager, MenuChoice};
pub use server::{build_journal_router, ServeState};
