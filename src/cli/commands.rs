//! CLI command implementations
//!
//! Configuration is loaded here and handed down; the server and store never
//! read the environment themselves.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::{DatabaseConfig, EnvSource};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::Logger;
use crate::store::{MemoryStore, MySqlStore, Store};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            host,
            port,
            memory,
            cred,
        } => serve(&cred, host, port, memory),
        Command::Check { cred } => check(&cred),
    }
}

/// Load settings from the process environment and the credentials file,
/// and apply `LOG_LEVEL`
fn load_source(cred_path: &Path) -> CliResult<EnvSource> {
    let source = EnvSource::with_cred_file(cred_path)?;
    Logger::set_min_severity(source.log_level()?);
    Ok(source)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Start the HTTP API
///
/// 1. Load configuration (environment, then credentials file)
/// 2. Build the store: in-process tables with `--memory`, otherwise a lazy
///    MySQL pool, so startup does not wait on the database
/// 3. Serve until ctrl-c
pub fn serve(
    cred_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    memory: bool,
) -> CliResult<()> {
    let source = load_source(cred_path)?;

    let mut http_config = HttpServerConfig::from_source(&source)?;
    if let Some(host) = host {
        http_config.host = host;
    }
    if let Some(port) = port {
        http_config.port = port;
    }

    let db_config = if memory {
        None
    } else {
        Some(DatabaseConfig::from_source(&source)?)
    };

    let backend = match &db_config {
        Some(db) => db.describe(),
        None => "memory".to_string(),
    };
    Logger::info(
        "SERVER_STARTING",
        &[
            ("addr", http_config.socket_addr().as_str()),
            ("store", backend.as_str()),
        ],
    );

    let rt = runtime()?;
    rt.block_on(run_server(db_config, http_config))
}

async fn run_server(
    db_config: Option<DatabaseConfig>,
    http_config: HttpServerConfig,
) -> CliResult<()> {
    let store: Arc<dyn Store> = match &db_config {
        Some(db) => Arc::new(MySqlStore::connect_lazy(db)?),
        None => Arc::new(MemoryStore::new()),
    };

    HttpServer::new(store, http_config)
        .start()
        .await
        .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

/// Ping the database once and print the outcome as JSON
pub fn check(cred_path: &Path) -> CliResult<()> {
    let source = load_source(cred_path)?;
    let db_config = DatabaseConfig::from_source(&source)?;

    let rt = runtime()?;

    let (report, outcome) = rt.block_on(async {
        let store = MySqlStore::connect_lazy(&db_config)?;
        let outcome = store.ping().await;
        store.close().await;
        Ok::<_, CliError>((check_report(&db_config.describe(), &outcome), outcome))
    })?;

    write_json(&report)?;
    outcome.map_err(CliError::from)
}

/// `{"target": ..., "database": "ok"|"unavailable", "error"?: ...}`
fn check_report(target: &str, outcome: &Result<(), crate::store::StoreError>) -> Value {
    match outcome {
        Ok(()) => json!({ "target": target, "database": "ok" }),
        Err(e) => json!({
            "target": target,
            "database": "unavailable",
            "error": e.to_string(),
        }),
    }
}
