//! CLI module for loja-api
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP API
//! - check: One-shot database connectivity check

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
