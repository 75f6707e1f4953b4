//! CLI configuration.
//!
//! Every setting can come from a flag or from the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `UNIONHALL_DATABASE` | unionhall.db | SQLite database path (`:memory:` allowed) |
//! | `UNIONHALL_LOG_LEVEL` | info | Log level |
//! | `UNIONHALL_DEFAULT_LIMIT` | 25 | Page size when `--limit` is absent |
//! | `UNIONHALL_MAX_LIMIT` | 100 | Largest accepted page size |
//! | `UNIONHALL_IN_FILTER_MAX` | 10 | Values per IN filter |
//! | `UNIONHALL_SEARCH_BATCH_SIZE` | 200 | Documents per search window |
//! | `UNIONHALL_SEARCH_MAX_DOCS` | 1000 | Documents read per search |
//! | `UNIONHALL_COUNT_MODE` | always | `always` or `never` count page-number requests |

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use unionhall_query::backends::sqlite::SqliteStoreConfig;
use unionhall_query::config::{CountMode, QueryConfig};

/// Unionhall query CLI.
#[derive(Debug, Clone, Parser)]
#[command(name = "unionhall")]
#[command(about = "Import, list, search and look up Unionhall documents")]
pub struct CliConfig {
    /// SQLite database path.
    #[arg(long, global = true, env = "UNIONHALL_DATABASE", default_value = "unionhall.db")]
    pub database: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "UNIONHALL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Page size used when a command does not pass --limit.
    #[arg(long, global = true, env = "UNIONHALL_DEFAULT_LIMIT", default_value = "25")]
    pub default_limit: u32,

    /// Largest accepted page size (at most 100).
    #[arg(long, global = true, env = "UNIONHALL_MAX_LIMIT", default_value = "100")]
    pub max_limit: u32,

    /// Values per IN filter; lookups are chunked to this size.
    #[arg(long, global = true, env = "UNIONHALL_IN_FILTER_MAX", default_value = "10")]
    pub in_filter_max: usize,

    /// Documents fetched per search window.
    #[arg(long, global = true, env = "UNIONHALL_SEARCH_BATCH_SIZE", default_value = "200")]
    pub search_batch_size: u32,

    /// Documents a single search may read.
    #[arg(long, global = true, env = "UNIONHALL_SEARCH_MAX_DOCS", default_value = "1000")]
    pub search_max_docs: u32,

    /// Whether page-number listings also count matching documents.
    #[arg(long, global = true, env = "UNIONHALL_COUNT_MODE", value_enum, default_value = "always")]
    pub count_mode: CountModeArg,

    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Count policy as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CountModeArg {
    /// Count every page-number request.
    Always,
    /// Never count.
    Never,
}

impl From<CountModeArg> for CountMode {
    fn from(arg: CountModeArg) -> Self {
        match arg {
            CountModeArg::Always => CountMode::Always,
            CountModeArg::Never => CountMode::Never,
        }
    }
}

/// Listing options shared by `list` and `search`.
#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// Collection to read.
    pub collection: String,

    /// Sort field; prefix with `-` for descending. Defaults to document id.
    #[arg(long, default_value = "__id__")]
    pub sort: String,

    /// 1-indexed page number.
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub page: i64,

    /// Page size.
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Cursor from a previous page.
    #[arg(long)]
    pub cursor: Option<String>,

    /// Equality filter as `field=value`; the value is parsed as JSON when possible.
    #[arg(long = "where", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,
}

/// CLI subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import a JSON array or newline-delimited JSON file into a collection.
    Import {
        /// Target collection.
        collection: String,

        /// File to read.
        file: PathBuf,

        /// Field holding each record's id; it is removed from the stored body.
        #[arg(long, default_value = "id")]
        id_field: String,
    },

    /// List one page of a collection.
    List(ListArgs),

    /// Search a collection for a term in the given fields.
    Search {
        #[command(flatten)]
        list: ListArgs,

        /// Search term (case-insensitive substring).
        #[arg(long)]
        term: String,

        /// Field to search; repeat for several.
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Fetch documents by id, or group documents by a field.
    Lookup {
        /// Collection to read.
        collection: String,

        /// Ids, or key values when --by is given.
        #[arg(required = true)]
        keys: Vec<String>,

        /// Group by this field instead of looking up ids.
        #[arg(long)]
        by: Option<String>,
    },
}

impl CliConfig {
    /// Builds the query layer configuration.
    pub fn to_query_config(&self) -> QueryConfig {
        QueryConfig {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            in_filter_max: self.in_filter_max,
            search_batch_size: self.search_batch_size,
            search_max_docs: self.search_max_docs,
            count_mode: self.count_mode.into(),
        }
    }

    /// Builds the SQLite store configuration.
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            max_in_values: self.in_filter_max,
            ..SqliteStoreConfig::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.trim().is_empty() {
            errors.push("database path must not be empty".to_string());
        }

        if let Err(query_errors) = self.to_query_config().validate() {
            errors.extend(query_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_command() {
        let config = CliConfig::parse_from([
            "unionhall",
            "--database",
            ":memory:",
            "list",
            "activities",
            "--sort",
            "-createdAt",
            "--limit",
            "10",
            "--where",
            "isPublished=true",
        ]);

        assert_eq!(config.database, ":memory:");
        match config.command {
            Command::List(args) => {
                assert_eq!(args.collection, "activities");
                assert_eq!(args.sort, "-createdAt");
                assert_eq!(args.limit, Some(10));
                assert_eq!(args.filters, vec!["isPublished=true"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_to_query_config() {
        let config = CliConfig::parse_from([
            "unionhall",
            "lookup",
            "users",
            "u1",
            "--count-mode",
            "never",
            "--in-filter-max",
            "5",
        ]);

        let query_config = config.to_query_config();
        assert_eq!(query_config.count_mode, CountMode::Never);
        assert_eq!(query_config.in_filter_max, 5);
        assert_eq!(config.store_config().max_in_values, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = CliConfig::parse_from(["unionhall", "list", "users"]);
        config.database = " ".to_string();
        config.max_limit = 0;

        let errors = config.validate().unwrap_err();
        assert!(errors.len() >= 2);
    }
}
