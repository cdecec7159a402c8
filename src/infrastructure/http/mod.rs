//! HTTP transport for the embedding inference endpoint
//!
//! A pooled reqwest client with bounded exponential-backoff retries over
//! transient failures.

pub mod client;
pub mod errors;
pub mod retry;

pub use client::{HttpResponse, RetryingHttpClient};
pub use errors::HttpError;
pub use retry::RetryPolicy;
