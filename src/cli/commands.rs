//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::Uri;
use tracing::info;

use crate::http_server::HttpServer;
use crate::observability::init_tracing;
use crate::query::{build_page, RawQuery};
use crate::store::{export_snapshot, Database, Resource};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let config = Config::load(cmd.config_path())?;
    init_tracing(config.log_format, &config.log_filter)
        .map_err(|e| CliError::logging_failed(e.to_string()))?;

    match cmd {
        Command::Serve { port, .. } => serve(&config, port),
        Command::Export {
            resource,
            query,
            out,
            ..
        } => export(&config, &resource, query.as_deref(), &out).map(|_| ()),
    }
}

/// Build the database, seeding it from `seed_dir` when configured
pub fn load_database(config: &Config) -> CliResult<Arc<Database>> {
    let db = Database::new();
    if let Some(dir) = &config.seed_dir {
        let loaded = db
            .seed_from_dir(dir)
            .map_err(|e| CliError::boot_failed(format!("Seeding failed: {}", e)))?;
        info!(dir = %dir.display(), documents = loaded, "database seeded");
    }
    Ok(Arc::new(db))
}

/// Serve the REST API until the process is stopped
pub fn serve(config: &Config, port: Option<u16>) -> CliResult<()> {
    let db = load_database(config)?;

    let mut server_config = config.server.clone();
    if let Some(port) = port {
        server_config.port = port;
    }
    let server = HttpServer::with_config(server_config, db);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Run one list query and write the resulting page to `out`.
///
/// Returns the number of documents written.
pub fn export(
    config: &Config,
    resource: &str,
    query: Option<&str>,
    out: &Path,
) -> CliResult<usize> {
    let resource: Resource = resource
        .parse()
        .map_err(|e: crate::store::UnknownResource| CliError::unknown_resource(e.to_string()))?;
    let raw = parse_query_string(query.unwrap_or_default())?;

    let db = load_database(config)?;
    let page = build_page(&raw, db.collection(resource))
        .map_err(|e| CliError::invalid_query(e.to_string()))?;

    export_snapshot(out, &page.items).map_err(|e| CliError::export_failed(e.to_string()))?;

    info!(
        collection = %resource,
        written = page.items.len(),
        total = page.total_count,
        out = %out.display(),
        "page exported"
    );
    Ok(page.items.len())
}

/// Decode a URL query string (with or without the leading `?`)
fn parse_query_string(query: &str) -> CliResult<RawQuery> {
    let query = query.trim().trim_start_matches('?');
    let uri: Uri = format!("/?{}", query)
        .parse()
        .map_err(|e| CliError::invalid_query(format!("{}: {}", query, e)))?;

    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri)
        .map_err(|e| CliError::invalid_query(format!("{}: {}", query, e)))?;

    RawQuery::from_pairs(pairs).map_err(|e| CliError::invalid_query(e.to_string()))
}
