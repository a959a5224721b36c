//! Command dispatch: bridges CLI args -> status sources -> output formatting.

pub mod config_cmd;
pub mod services;
pub mod set;
pub mod stats;
pub mod status;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a data command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(global).await,
        Command::Services => services::handle(global).await,
        Command::Stats => stats::handle(global).await,
        Command::Set(args) => set::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
