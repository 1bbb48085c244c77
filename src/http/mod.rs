//! HTTP client module
//!
//! Thin authenticated client for the site's backup API.
//!
//! # Behavior
//!
//! - **Single attempt**: no retries, no backoff, no rate limiting
//! - **No default timeout**: the invoking host's deadline is the only one
//! - **Authentication**: every request carries the site credentials
//! - **Raw responses**: status handling is left to the caller, since each
//!   endpoint maps failures to a different error

mod client;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
