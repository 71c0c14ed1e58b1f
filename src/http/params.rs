//! Ordered query parameters
//!
//! Parameters keep insertion order so the query string the server sees is
//! stable, and setting an existing key replaces its value in place.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Query parameters sent with a resource request and replayed on every
/// continuation request of the same iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Add or replace a parameter in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pairs in the shape `reqwest::RequestBuilder::query` accepts
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Keys from `required` that are not present, in the order given
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|key| !self.contains(key))
            .collect()
    }

    /// Fail with [`Error::MissingParameters`] unless every required key is set
    pub fn require(&self, resource: &str, required: &[&str]) -> Result<()> {
        let missing = self.missing(required);
        if missing.is_empty() {
            return Ok(());
        }
        Err(Error::MissingParameters {
            resource: resource.to_string(),
            keys: missing.into_iter().map(str::to_string).collect(),
        })
    }

    /// Transaction window used by the punch resources
    pub fn transaction_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new()
            .with("filterTransactionStartTimeUTC", format_utc(start))
            .with("filterTransactionEndTimeUTC", format_utc(end))
    }

    /// Date window used by the employee schedules resource
    pub fn schedule_window(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new()
            .with("filterScheduleStartDate", start.format("%Y-%m-%d").to_string())
            .with("filterScheduleEndDate", end.format("%Y-%m-%d").to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

fn format_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order_and_replace() {
        let params = QueryParams::new()
            .with("b", "1")
            .with("a", "2")
            .with("b", "3");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("b", "3"), ("a", "2")]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_require_names_missing_keys() {
        let params = QueryParams::new().with("filterTransactionStartTimeUTC", "2019-11-01");
        let err = params
            .require(
                "EmployeeRawPunches",
                &["filterTransactionStartTimeUTC", "filterTransactionEndTimeUTC"],
            )
            .unwrap_err();

        match err {
            Error::MissingParameters { resource, keys } => {
                assert_eq!(resource, "EmployeeRawPunches");
                assert_eq!(keys, vec!["filterTransactionEndTimeUTC".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_require_passes_with_extra_keys() {
        let params = QueryParams::from_iter([("x", "1"), ("y", "2"), ("z", "3")]);
        assert!(params.require("R", &["x", "y"]).is_ok());
        assert!(params.require("R", &[]).is_ok());
    }

    #[test]
    fn test_transaction_window_format() {
        let start = Utc.with_ymd_and_hms(2019, 11, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2019, 11, 5, 12, 30, 0).unwrap();
        let params = QueryParams::transaction_window(start, end);

        assert_eq!(
            params.get("filterTransactionStartTimeUTC"),
            Some("2019-11-01T00:00:00Z")
        );
        assert_eq!(
            params.get("filterTransactionEndTimeUTC"),
            Some("2019-11-05T12:30:00Z")
        );
    }

    #[test]
    fn test_schedule_window_format() {
        let params = QueryParams::schedule_window(
            NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 12).unwrap(),
        );
        assert_eq!(params.get("filterScheduleStartDate"), Some("2020-01-06"));
        assert_eq!(params.get("filterScheduleEndDate"), Some("2020-01-12"));
    }
}
