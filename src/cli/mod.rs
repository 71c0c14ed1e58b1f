//! CLI module
//!
//! Command-line interface over the REST client and the import file drop.
//!
//! # Commands
//!
//! - `get` - Fetch every record of a resource
//! - `report` - Fetch every row of a report
//! - `upload` - Upload a batch import file
//! - `status` - Check or wait for an import outcome

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
