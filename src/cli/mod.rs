//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Seed the collections and serve the REST API
//! - export: Write one page of a list query to a JSON file

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{export, load_database, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
