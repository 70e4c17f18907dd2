mod readiness;
mod router;
mod state;

pub use readiness::run_startup_readiness_checks;
pub use router::{build_api_router, build_journal_router, journal_shell_router};
pub use state::{ServeHealth, ServeHealthSnapshot, ServeState};
