//! Error types for the Dayforce client
//!
//! Every public API returns `Result<T, Error>`. Variants are grouped by the
//! channel that produced them so callers can branch on the failure kind
//! (for example treat [`Error::ImportFailed`] as terminal, or inspect
//! [`Error::is_transport`] before deciding to try again later).

use thiserror::Error;

/// The main error type for the Dayforce client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Missing required query parameters for {resource}: {}", keys.join(", "))]
    MissingParameters { resource: String, keys: Vec<String> },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("SFTP error: {message}")]
    Sftp { message: String },

    // ============================================================================
    // Response Errors
    // ============================================================================
    #[error("Malformed page: {message}")]
    MalformedPage { message: String },

    // ============================================================================
    // Import Errors
    // ============================================================================
    #[error("File '{path}' is {size} bytes, over the {limit} byte upload limit")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    #[error("Import '{token}' failed, error marker found at {marker}")]
    ImportFailed { token: String, marker: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an SFTP transport error
    pub fn sftp(message: impl Into<String>) -> Self {
        Self::Sftp {
            message: message.into(),
        }
    }

    /// Create a malformed page error
    pub fn malformed_page(message: impl Into<String>) -> Self {
        Self::MalformedPage {
            message: message.into(),
        }
    }

    /// Network or protocol failure on either channel, including non-success
    /// HTTP statuses. Nothing in the crate retries these.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::Sftp { .. }
        )
    }

    /// Misconfiguration detected before any I/O
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
        )
    }
}

/// Result type alias for the Dayforce client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("client_namespace");
        assert_eq!(
            err.to_string(),
            "Missing required config field: client_namespace"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_missing_parameters_display() {
        let err = Error::MissingParameters {
            resource: "EmployeeRawPunches".to_string(),
            keys: vec![
                "filterTransactionStartTimeUTC".to_string(),
                "filterTransactionEndTimeUTC".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Missing required query parameters for EmployeeRawPunches: \
             filterTransactionStartTimeUTC, filterTransactionEndTimeUTC"
        );
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::http_status(500, "").is_transport());
        assert!(Error::http_status(401, "").is_transport());
        assert!(Error::sftp("connection reset").is_transport());

        assert!(!Error::config("bad").is_transport());
        assert!(!Error::malformed_page("no Data").is_transport());
        assert!(!Error::ImportFailed {
            token: "/Import/Employee/a.xml".to_string(),
            marker: "/Import/Employee/error/a.xml.error".to_string(),
        }
        .is_transport());
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("x").is_config());
        assert!(Error::missing_field("host").is_config());
        assert!(Error::invalid_value("port", "zero").is_config());
        assert!(!Error::http_status(400, "").is_config());
    }
}
