//! HTTP plumbing for the Dayforce REST API
//!
//! One request in, one response out:
//! - Basic credentials, JSON content headers and user agent on every request
//! - Fixed per-request timeout
//! - Non-success statuses turned into [`Error::HttpStatus`]
//!
//! Nothing is retried here. A failure is returned to the caller as-is.

use super::params::QueryParams;
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::pagination::{Page, PageFetcher};
use crate::types::JsonValue;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use std::time::Duration;
use tracing::debug;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL that relative resource paths are joined to
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("dayforce-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Authenticated JSON client
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a client that sends `credentials` with every request
    pub fn new(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url` with `params` and return the raw response
    pub async fn get(&self, url: &str, params: &QueryParams) -> Result<Response> {
        self.request(Method::GET, url, params, None).await
    }

    /// GET `url` with `params` and parse the body as JSON.
    ///
    /// A successful response that is not JSON is a [`Error::MalformedPage`].
    pub async fn get_json(&self, url: &str, params: &QueryParams) -> Result<JsonValue> {
        let text = self.get(url, params).await?.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::malformed_page(format!("{}: body is not JSON ({e})", self.build_url(url)))
        })
    }

    /// POST a JSON body to `url` and parse the response as JSON
    pub async fn post_json(&self, url: &str, body: &JsonValue) -> Result<JsonValue> {
        let text = self
            .request(Method::POST, url, &QueryParams::new(), Some(body))
            .await?
            .text()
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send one request. Non-success statuses become errors.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: &QueryParams,
        body: Option<&JsonValue>,
    ) -> Result<Response> {
        let full_url = self.build_url(url);

        let mut req = self.client.request(method.clone(), &full_url);
        if !params.is_empty() {
            req = req.query(params.as_pairs());
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req = self.credentials.apply(req);

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Request failed: {} {} -> {}", method, full_url, status);
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!("Request succeeded: {} {}", method, full_url);
        Ok(response)
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str, params: &QueryParams) -> Result<Page> {
        let body = self.get_json(url, params).await?;
        Ok(Page::new(self.build_url(url), body))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
