//! HTTP client module
//!
//! Provides the HTTP client used to fetch pages.
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Typed failures**: Non-2xx statuses and timeouts become [`crate::Error`] variants

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
