//! Configuration types
//!
//! Configuration is built once, validated, and then passed by value into
//! the REST client and the file-drop workflow. Files may be YAML or JSON:
//!
//! ```yaml
//! api:
//!   username: svc_user
//!   password: secret
//!   client_namespace: acme
//!   rate_limit:
//!     max_requests: 100
//!     period_seconds: 60
//! sftp:
//!   host: sftp.dayforcehcm.com
//!   username: svc_user
//!   password: secret
//!   host_key: "ssh-ed25519 AAAAC3Nza..."
//! ```

use crate::auth::{Credentials, Secret};
use crate::error::{Error, Result};
use crate::filedrop::HostKeyPolicy;
use crate::http::{HttpClientConfig, RateLimit};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `api.password`
pub const API_PASSWORD_ENV: &str = "DAYFORCE_PASSWORD";

/// Environment variable overriding `sftp.password`
pub const SFTP_PASSWORD_ENV: &str = "DAYFORCE_SFTP_PASSWORD";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayforceConfig {
    /// REST API settings
    pub api: ApiConfig,

    /// Batch import drop settings
    #[serde(default)]
    pub sftp: Option<SftpConfig>,
}

impl DayforceConfig {
    /// Load a YAML (`.yaml`/`.yml`) or JSON file and apply environment
    /// overrides. The result is validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config(format!("Config file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validating
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse JSON without validating
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replace passwords with values found through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(API_PASSWORD_ENV) {
            self.api.password = Secret::new(password);
        }
        if let Some(sftp) = self.sftp.as_mut() {
            if let Some(password) = lookup(SFTP_PASSWORD_ENV) {
                sftp.password = Secret::new(password);
            }
        }
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        if let Some(sftp) = &self.sftp {
            sftp.validate()?;
        }
        Ok(())
    }

    /// The SFTP section, required by the import commands
    pub fn require_sftp(&self) -> Result<&SftpConfig> {
        self.sftp.as_ref().ok_or_else(|| Error::missing_field("sftp"))
    }
}

// ============================================================================
// REST API
// ============================================================================

/// REST API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API user
    pub username: String,

    /// API password
    #[serde(default)]
    pub password: Secret,

    /// Client namespace, the tenant segment of every URL
    pub client_namespace: String,

    /// Dayforce release number, selects the service host
    #[serde(default = "default_release")]
    pub release: u32,

    /// API version segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Use this base URL instead of the one derived from release and namespace
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Request cap applied to each paginated sequence
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,
}

fn default_release() -> u32 {
    57
}

fn default_api_version() -> String {
    "V1".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl ApiConfig {
    /// Config with the default release, API version and timeout
    pub fn new(
        username: impl Into<String>,
        password: impl Into<Secret>,
        client_namespace: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            client_namespace: client_namespace.into(),
            release: default_release(),
            api_version: default_api_version(),
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
            rate_limit: None,
        }
    }

    /// Set the release number
    #[must_use]
    pub fn with_release(mut self, release: u32) -> Self {
        self.release = release;
        self
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-sequence rate limit
    #[must_use]
    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    /// Base URL for resource requests
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://usr{}-services.dayforcehcm.com/Api/{}/{}",
                self.release, self.client_namespace, self.api_version
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url())
            .timeout(self.timeout())
            .build()
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::missing_field("api.username"));
        }
        if self.password.is_empty() {
            return Err(Error::missing_field("api.password"));
        }
        if self.client_namespace.is_empty() && self.base_url.is_none() {
            return Err(Error::missing_field("api.client_namespace"));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value("api.timeout_seconds", "must be positive"));
        }
        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)?;
        }
        if let Some(limit) = &self.rate_limit {
            limit.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// SFTP
// ============================================================================

/// Batch import drop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpConfig {
    /// SFTP host name
    pub host: String,

    #[serde(default = "default_sftp_port")]
    pub port: u16,

    pub username: String,

    #[serde(default)]
    pub password: Secret,

    /// Remote directory that contains `Import/`
    #[serde(default)]
    pub root: String,

    /// Skip host-key verification entirely
    #[serde(default)]
    pub disable_host_key_check: bool,

    /// Expected server key, OpenSSH format (`ssh-ed25519 AAAA...`) or bare base64
    #[serde(default)]
    pub host_key: Option<String>,

    /// Timeout for connecting and for each remote operation
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_sftp_port() -> u16 {
    22
}

impl SftpConfig {
    /// Config with default port, root and timeout, and no host-key decision
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<Secret>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_sftp_port(),
            username: username.into(),
            password: password.into(),
            root: String::new(),
            disable_host_key_check: false,
            host_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Pin the server's public key
    #[must_use]
    pub fn with_host_key(mut self, key: impl Into<String>) -> Self {
        self.host_key = Some(key.into());
        self
    }

    /// Turn off host-key verification
    #[must_use]
    pub fn without_host_key_check(mut self) -> Self {
        self.disable_host_key_check = true;
        self
    }

    /// Set the remote root directory
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// Resolve how the server's host key is trusted
    pub fn host_key_policy(&self) -> Result<HostKeyPolicy> {
        HostKeyPolicy::resolve(self.disable_host_key_check, self.host_key.as_deref())
    }

    /// Check required fields, value ranges and the host-key combination
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::missing_field("sftp.host"));
        }
        if self.username.is_empty() {
            return Err(Error::missing_field("sftp.username"));
        }
        if self.port == 0 {
            return Err(Error::invalid_value("sftp.port", "must be positive"));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value("sftp.timeout_seconds", "must be positive"));
        }
        self.host_key_policy()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const YAML: &str = r"
api:
  username: foo
  password: bar
  client_namespace: foobar
  rate_limit:
    max_requests: 2
    period_seconds: 60
sftp:
  host: sftp.example.com
  username: foo
  password: bar
  disable_host_key_check: true
";

    #[test]
    fn test_base_url_derived_from_release_and_namespace() {
        let config = ApiConfig::new("foo", "bar", "foobar");
        assert_eq!(
            config.base_url(),
            "https://usr57-services.dayforcehcm.com/Api/foobar/V1"
        );

        let config = config.with_release(62);
        assert_eq!(
            config.base_url(),
            "https://usr62-services.dayforcehcm.com/Api/foobar/V1"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = ApiConfig::new("foo", "bar", "foobar").with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = DayforceConfig::from_yaml_str(YAML).unwrap();
        config.validate().unwrap();

        assert_eq!(config.api.release, 57);
        assert_eq!(config.api.api_version, "V1");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.api.rate_limit, Some(RateLimit::new(2, 60).unwrap()));

        let sftp = config.sftp.unwrap();
        assert_eq!(sftp.port, 22);
        assert_eq!(sftp.root, "");
        assert_eq!(sftp.host_key_policy().unwrap(), HostKeyPolicy::Disabled);
    }

    #[test]
    fn test_from_json() {
        let config = DayforceConfig::from_json_str(
            r#"{"api": {"username": "u", "password": "p", "client_namespace": "ns",
                "release": 60}}"#,
        )
        .unwrap();
        assert_eq!(config.api.release, 60);
        assert!(config.sftp.is_none());
        assert!(config.require_sftp().unwrap_err().is_config());
    }

    #[test]
    fn test_validate_missing_fields() {
        let err = ApiConfig::new("", "bar", "ns").validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "api.username"));

        let err = ApiConfig::new("foo", "", "ns").validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "api.password"));

        let err = ApiConfig::new("foo", "bar", "").validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_validate_rejects_zero_rate_limit() {
        let mut config = ApiConfig::new("foo", "bar", "ns");
        config.rate_limit = Some(RateLimit {
            max_requests: 0,
            period_seconds: 60,
        });
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_sftp_requires_host_key_decision() {
        let sftp = SftpConfig::new("sftp.example.com", "foo", "bar");
        assert!(sftp.validate().unwrap_err().is_config());

        assert!(sftp.clone().without_host_key_check().validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DayforceConfig::from_yaml_str(YAML).unwrap();
        config.apply_env_overrides(|key| match key {
            API_PASSWORD_ENV => Some("from-env".to_string()),
            SFTP_PASSWORD_ENV => Some("sftp-env".to_string()),
            _ => None,
        });

        assert_eq!(config.api.password.expose(), "from-env");
        assert_eq!(config.sftp.unwrap().password.expose(), "sftp-env");
    }

    #[test]
    fn test_from_file_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = DayforceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api.client_namespace, "foobar");
    }

    #[test]
    fn test_from_file_missing() {
        let err = DayforceConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_debug_hides_passwords() {
        let config = DayforceConfig::from_yaml_str(YAML).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("password: \"***\""));
        assert!(!debug.contains("password: \"bar\""));
    }
}
