//! Unionhall CLI
//!
//! Operator tool over the SQLite document store: import documents, and list,
//! search or look them up through the same pagers the API uses. Results are
//! printed to stdout as JSON; logs go to stderr.

mod commands;
mod config;

use clap::Parser;
use tracing::info;
use unionhall_query::backends::sqlite::SqliteStore;
use unionhall_query::paging::Paginator;

use crate::config::CliConfig;

/// Initializes the tracing subscriber, honoring `RUST_LOG` when set.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("unionhall_query={},unionhall_cli={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Opens the store and makes sure its schema exists.
fn open_store(config: &CliConfig) -> anyhow::Result<SqliteStore> {
    info!(database = %config.database, "Opening SQLite store");
    let store = SqliteStore::with_config(&config.database, config.store_config())?;
    store.init_schema()?;
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let store = open_store(&config)?;
    let paginator = Paginator::new(config.to_query_config());

    let output = commands::run(&config.command, &store, &paginator).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
