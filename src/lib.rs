//! # Dayforce Client
//!
//! Async client for the Dayforce HCM platform.
//!
//! ## Features
//!
//! - **REST Resources**: employees, punches, schedules, reports and metadata
//! - **Lazy Pagination**: follows `Paging.Next` one page at a time
//! - **Rate Limiting**: sliding-window request cap per sequence
//! - **Batch Imports**: SFTP upload with atomic rename and marker-file status
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dayforce_client::{DayforceClient, QueryParams, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = DayforceClient::from_config_file("dayforce.yaml")?;
//!
//!     let mut employees = client.employees(QueryParams::new()).await?;
//!     while let Some((_page, record)) = employees.next().await? {
//!         println!("{}", record["XRefCode"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌─────────────────────────────┐
//! │        DayforceClient        │   │          FileDrop           │
//! │  resources, required params  │   │  upload → .ready, markers   │
//! └──────────────┬───────────────┘   └──────────────┬──────────────┘
//!                │                                  │
//! ┌──────────────┴───────────────┐   ┌──────────────┴──────────────┐
//! │ PaginatedSequence            │   │ StoreConnector / RemoteStore│
//! │ RateLimiter · PageFetcher    │   │ SFTP (russh) · in-memory    │
//! ├──────────────────────────────┤   └─────────────────────────────┘
//! │ HttpClient (reqwest, basic)  │
//! └──────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credentials and secret handling
pub mod auth;

/// HTTP client, query parameters and rate limiting
pub mod http;

/// Lazy page-following record sequences
pub mod pagination;

/// Dayforce REST resources
pub mod api;

/// SFTP batch import file drop
pub mod filedrop;

/// Configuration file loading
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::DayforceClient;
pub use config::{ApiConfig, DayforceConfig, SftpConfig};
pub use filedrop::{FileDrop, ImportState, ImportToken};
pub use http::{QueryParams, RateLimit};
pub use pagination::{Page, PaginatedSequence, RecordShape};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
