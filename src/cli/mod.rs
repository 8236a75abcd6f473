//! Interactive and scripted shell over the period ledger.

pub mod commands;
pub mod output;
pub mod shell;
pub mod shell_context;

use thiserror::Error;

use crate::{config::ConfigError, errors::LedgerError};

pub use shell::run_cli;
pub use shell_context::{CliMode, ShellContext};

/// Environment variable that switches the shell to line-by-line stdin mode.
pub const SCRIPT_ENV: &str = "PARCEL_LEDGER_CLI_SCRIPT";
/// Environment variable that pins "today" to a fixed `YYYY-MM-DD` date.
pub const TODAY_ENV: &str = "PARCEL_LEDGER_TODAY";

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Terminal error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}
