//! CLI argument definitions using clap
//!
//! Commands:
//! - loja-api serve [--host <host>] [--port <port>] [--memory] [--cred <path>]
//! - loja-api check [--cred <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CRED_FILE;

/// loja-api - JSON API for customers, products, carts and orders
#[derive(Parser, Debug)]
#[command(name = "loja-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Bind host (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Use the in-process store instead of MySQL
        #[arg(long)]
        memory: bool,

        /// Path to the credentials file
        #[arg(long, default_value = DEFAULT_CRED_FILE)]
        cred: PathBuf,
    },

    /// Check database connectivity and exit
    Check {
        /// Path to the credentials file
        #[arg(long, default_value = DEFAULT_CRED_FILE)]
        cred: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
