//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dayforce HCM command-line client
#[derive(Parser, Debug)]
#[command(name = "dayforce")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, default_value = "dayforce.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter. `--verbose` raises this crate to debug and leaves
    /// dependencies at warn.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "warn,dayforce_client=debug"
        } else {
            "warn,dayforce_client=info"
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every record of a resource, following continuation pages
    Get {
        /// Resource path relative to the API base, e.g. `Employees`
        resource: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Records are nested under `Data.Rows`
        #[arg(long)]
        rows: bool,

        /// Print only the first page body
        #[arg(long)]
        page: bool,
    },

    /// Fetch every row of a report
    Report {
        /// Report XRefCode
        xref_code: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Upload a batch import file and print its token
    Upload {
        /// Local file to upload
        file: PathBuf,

        /// Import type, e.g. `Employee`
        import_type: String,
    },

    /// Check the outcome of an uploaded import
    Status {
        /// Token printed by `upload`
        token: String,

        /// Poll until the import succeeds or fails
        #[arg(long)]
        wait: bool,

        /// Seconds between polls when waiting
        #[arg(long, default_value = "30")]
        interval: u64,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Indented JSON
    Pretty,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
