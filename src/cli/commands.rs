use clap::Subcommand;

use super::info::InfoArgs;
use super::serve::ServeArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Serve the journal pages and JSON API
    Serve(ServeArgs),

    /// Manage reflections from an interactive text menu
    Manage,

    /// Show build information and the state of both collection files
    Info(InfoArgs),
}
