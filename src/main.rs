//! Todo List App with SQLite
//!
//! Serves a single-page todo list backed by a local SQLite file.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use todo_sqlite::cli::Cli;
use todo_sqlite::config::Config;
use todo_sqlite::dashboard;
use todo_sqlite::db::Database;
use todo_sqlite::logging::{self, LogTarget};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let (mut config, config_path) = Config::resolve(cli.config.as_deref())?;

    // Override from CLI arguments
    if let Some(db_path) = cli.database {
        config.server.db_path = db_path;
    }
    if let Some(host) = cli.host {
        config.ui.host = host;
    }
    if let Some(port) = cli.port {
        config.ui.port = port;
    }

    info!("Starting todo-sqlite v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!("Config: {:?}", path);
    }
    info!("Database: {:?}", config.server.db_path);

    let db = Arc::new(Database::open(&config.server.db_path)?);
    info!("Database initialized successfully");

    let server = dashboard::start_server(Arc::clone(&db), &config.bind_addr()).await?;
    info!("Open http://{} in a browser", server.addr());

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    server.shutdown().await;

    Ok(())
}
