//! Dayforce REST client
//!
//! Thin wrappers over the resources, all funnelled through two calls:
//! [`DayforceClient::get_resource`] for a single page and
//! [`DayforceClient::paginate`] for a lazily fetched record sequence.

use super::resources;
use crate::config::{ApiConfig, DayforceConfig};
use crate::error::Result;
use crate::http::{HttpClient, QueryParams, RateLimit};
use crate::pagination::{Page, PageFetcher, PaginatedSequence, RecordShape};
use crate::types::JsonValue;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Client for the Dayforce REST API
#[derive(Debug, Clone)]
pub struct DayforceClient {
    http: Arc<HttpClient>,
    base_url: String,
    rate_limit: Option<RateLimit>,
}

impl DayforceClient {
    /// Build a client from validated API settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new(config.http_config(), config.credentials())?;
        Ok(Self {
            http: Arc::new(http),
            base_url: config.base_url(),
            rate_limit: config.rate_limit,
        })
    }

    /// Build a client from the `api` section of a config file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = DayforceConfig::from_file(path)?;
        Self::new(&config.api)
    }

    /// Base URL all resources are relative to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request cap applied to each sequence this client starts
    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit
    }

    /// Absolute URL of a resource
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // ------------------------------------------------------------------------
    // Generic access
    // ------------------------------------------------------------------------

    /// Fetch the first page of a resource.
    ///
    /// Fails with [`Error::MissingParameters`](crate::Error::MissingParameters)
    /// before sending anything when a required parameter is absent.
    pub async fn get_resource(&self, resource: &str, params: &QueryParams) -> Result<Page> {
        params.require(resource, resources::required_params(resource))?;
        self.http.fetch(&self.resource_url(resource), params).await
    }

    /// Start a lazily fetched sequence over every page of a resource.
    ///
    /// Required parameters are checked as in [`DayforceClient::get_resource`].
    pub async fn paginate(
        &self,
        resource: &str,
        params: QueryParams,
        shape: RecordShape,
    ) -> Result<PaginatedSequence> {
        params.require(resource, resources::required_params(resource))?;
        let url = self.resource_url(resource);
        debug!("Paginating {} ({:?})", url, shape);
        let fetcher: Arc<dyn PageFetcher> = self.http.clone();
        PaginatedSequence::start(fetcher, &url, params, shape, self.rate_limit).await
    }

    /// POST a JSON document to a resource
    pub async fn post_resource(&self, resource: &str, body: &JsonValue) -> Result<JsonValue> {
        self.http.post_json(&self.resource_url(resource), body).await
    }

    // ------------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------------

    pub async fn client_metadata(&self) -> Result<Page> {
        self.get_resource(resources::CLIENT_METADATA, &QueryParams::new())
            .await
    }

    // ------------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------------

    /// First page of employees
    pub async fn get_employees(&self, params: &QueryParams) -> Result<Page> {
        self.get_resource(resources::EMPLOYEES, params).await
    }

    /// Every employee, page by page
    pub async fn employees(&self, params: QueryParams) -> Result<PaginatedSequence> {
        self.paginate(resources::EMPLOYEES, params, RecordShape::Flat)
            .await
    }

    pub async fn employee_details(&self, xref_code: &str, params: &QueryParams) -> Result<Page> {
        self.get_resource(&resources::employee(xref_code), params)
            .await
    }

    /// Raw punches in a transaction window. Both window bounds are required.
    pub async fn employee_raw_punches(&self, params: QueryParams) -> Result<PaginatedSequence> {
        self.paginate(resources::EMPLOYEE_RAW_PUNCHES, params, RecordShape::Flat)
            .await
    }

    /// Processed punches in a transaction window. Both window bounds are
    /// required.
    pub async fn employee_punches(&self, params: QueryParams) -> Result<PaginatedSequence> {
        self.paginate(resources::EMPLOYEE_PUNCHES, params, RecordShape::Flat)
            .await
    }

    /// Schedules of one employee. Both schedule dates are required.
    pub async fn employee_schedules(
        &self,
        xref_code: &str,
        params: QueryParams,
    ) -> Result<PaginatedSequence> {
        self.paginate(
            &resources::employee_schedules(xref_code),
            params,
            RecordShape::Flat,
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    /// Metadata of every report available to the user
    pub async fn reports(&self) -> Result<Page> {
        self.get_resource(resources::REPORT_METADATA, &QueryParams::new())
            .await
    }

    pub async fn report_metadata(&self, xref_code: &str) -> Result<Page> {
        self.get_resource(&resources::report_metadata(xref_code), &QueryParams::new())
            .await
    }

    /// First page of a report
    pub async fn get_report(&self, xref_code: &str, params: &QueryParams) -> Result<Page> {
        self.get_resource(&resources::report(xref_code), params)
            .await
    }

    /// Every row of a report, page by page
    pub async fn report_rows(
        &self,
        xref_code: &str,
        params: QueryParams,
    ) -> Result<PaginatedSequence> {
        self.paginate(&resources::report(xref_code), params, RecordShape::NestedRows)
            .await
    }
}
