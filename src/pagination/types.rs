//! Page documents and record extraction
//!
//! A Dayforce list response looks like
//!
//! ```json
//! { "Data": [ {...}, {...} ], "Paging": { "Next": "https://..." } }
//! ```
//!
//! Report resources nest the records one level deeper, under `Data.Rows`.

use crate::error::{Error, Result};
use crate::http::QueryParams;
use crate::types::JsonValue;
use async_trait::async_trait;

const DATA_KEY: &str = "Data";
const ROWS_KEY: &str = "Rows";
const PAGING_KEY: &str = "Paging";
const NEXT_KEY: &str = "Next";

/// Where the records of a page live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordShape {
    /// Records are the elements of `Data`
    #[default]
    Flat,
    /// Records are the elements of `Data.Rows` (report resources)
    NestedRows,
}

/// One parsed response document
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    url: String,
    body: JsonValue,
}

impl Page {
    /// Wrap a response body fetched from `url`
    pub fn new(url: impl Into<String>, body: JsonValue) -> Self {
        Self {
            url: url.into(),
            body,
        }
    }

    /// URL this page was fetched from (without query parameters)
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw document
    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    pub fn into_body(self) -> JsonValue {
        self.body
    }

    /// Any top-level key of the document
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.body.get(key)
    }

    /// Continuation URL, if the server announced another page.
    ///
    /// A missing `Paging` object, a missing or null `Next`, and an empty
    /// `Next` string all mean this is the last page.
    pub fn next_url(&self) -> Option<&str> {
        self.body
            .get(PAGING_KEY)?
            .get(NEXT_KEY)?
            .as_str()
            .filter(|next| !next.is_empty())
    }

    pub fn is_final(&self) -> bool {
        self.next_url().is_none()
    }

    /// Records carried by this page
    pub fn records(&self, shape: RecordShape) -> Result<&[JsonValue]> {
        let data = self
            .body
            .get(DATA_KEY)
            .ok_or_else(|| Error::malformed_page(format!("{}: missing '{DATA_KEY}'", self.url)))?;

        let records = match shape {
            RecordShape::Flat => data,
            RecordShape::NestedRows => data.get(ROWS_KEY).ok_or_else(|| {
                Error::malformed_page(format!("{}: missing '{DATA_KEY}.{ROWS_KEY}'", self.url))
            })?,
        };

        records.as_array().map(Vec::as_slice).ok_or_else(|| {
            Error::malformed_page(format!("{}: records are not an array", self.url))
        })
    }
}

/// Performs one GET against a resource or continuation URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single page. Transport failures and non-success statuses are
    /// returned as errors; nothing is retried.
    async fn fetch(&self, url: &str, params: &QueryParams) -> Result<Page>;
}
