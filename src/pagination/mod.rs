//! Pagination module
//!
//! Turns a Dayforce list response into a lazily fetched sequence of records.
//!
//! # Overview
//!
//! Every page may carry a `Paging.Next` continuation URL. The
//! [`PaginatedSequence`] drains the records of the current page, then
//! follows the continuation (rate limited, with the original parameters)
//! until a page without one is reached.

mod sequence;
mod types;

pub use sequence::{Cursor, PageRecord, PaginatedSequence};
pub use types::{Page, PageFetcher, RecordShape};
