//! CLI argument definitions using clap
//!
//! Commands:
//! - rescue-api serve --config <path> [--port <n>]
//! - rescue-api export --config <path> --resource <name> [--query <qs>] --out <file>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Rescue API - NGO, animal, review and user records over HTTP
#[derive(Parser, Debug)]
#[command(name = "rescue-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed the collections and serve the REST API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./rescue.json")]
        config: PathBuf,

        /// Port override (default: from config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one list query over the seeded data and write the page to a file
    Export {
        /// Path to configuration file
        #[arg(long, default_value = "./rescue.json")]
        config: PathBuf,

        /// Collection to query (ngos, animals, reviews, users)
        #[arg(long)]
        resource: String,

        /// Query string, e.g. "rescue_priority=High&sort=name&limit=10"
        #[arg(long)]
        query: Option<String>,

        /// Output file for the JSON array of documents
        #[arg(long)]
        out: PathBuf,
    },
}

impl Command {
    /// Configuration file named by the command
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Serve { config, .. } | Command::Export { config, .. } => config,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
