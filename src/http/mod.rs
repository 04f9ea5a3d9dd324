//! HTTP client module
//!
//! Provides the HTTP client the REST transport sends requests through.
//!
//! # Features
//!
//! - **Retries**: Exponential backoff bounded by an overall deadline, limited
//!   to the status classes a [`RetryPolicy`] names
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Error Envelopes**: Google API error bodies become [`Error::Api`]
//! - **Authentication**: Integration with the auth module
//!
//! [`Error::Api`]: crate::error::Error::Api

mod client;
mod rate_limit;
mod retry;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::RetryPolicy;
