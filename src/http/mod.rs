//! HTTP client module
//!
//! Provides the authenticated JSON client used for every Dayforce REST call,
//! the ordered query parameters it sends, and the sliding-window rate limiter
//! applied per paginated sequence.

mod client;
mod params;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use params::QueryParams;
pub use rate_limit::{throttle, RateLimit, RateLimiter};
