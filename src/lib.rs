// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Configurable Outbound HTTP Client
//!
//! An HTTP client for service-to-service calls, built on reqwest with
//! transport customization the stock client does not expose.
//!
//! ## Features
//!
//! - Retry with exponential backoff and a pluggable retry predicate
//! - Request/response interceptors for auth injection, logging, metrics
//! - Proxy routing, connect timeouts, per-host idle-connection ceilings
//! - DNS resolver override: dial service names through your own lookup
//! - Unix-domain-socket dialing for local daemons
//! - Streaming multipart file upload through a bounded pipe
//! - Single-consumption response wrapper with JSON/protobuf decoding
//! - Prometheus counter + latency histogram per (host, path)
//! - Wire-level debug dumping through `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use mustekala::{Body, ClientConfig, HttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(
//!         ClientConfig::new()
//!             .with_retry_times(2)
//!             .enable_default_header(),
//!     );
//!
//!     let mut response = client
//!         .get("https://example.com/api/items", &[("page", "1")], None)
//!         .await?;
//!
//!     if response.is_status_ok() {
//!         println!("{}", response.text().await?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod interceptor;
pub mod metrics;

mod transport;

// Re-exports for convenience

// Client
pub use client::{
    default_should_retry, Body, ClientConfig, DnsResolverFn, HttpClient, Response,
    RetryPredicate, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HEADERS, DEFAULT_MAX_IDLE_PER_HOST,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FILE_FIELD_NAME_KEY,
};

// Errors
pub use error::{Error, Result};

// Interceptors
pub use interceptor::{Interceptor, Outcome, RequestContext, RequestLogger};

// Metrics
pub use metrics::{Metrics, UrlFormatter};

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
