// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the Mustekala HTTP client
//!
//! Splits failures into configuration errors (never retried), transport
//! errors (retried up to the configured count) and response-consumption
//! errors (never retried).

use std::time::Duration;

use thiserror::Error;

/// Result type alias for Mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Mustekala HTTP client
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Unix-socket exchange failed
    #[error("Connection error: {0}")]
    Connection(#[from] hyper::Error),

    /// Operation exceeded the configured deadline
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Client or transport configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization or decode failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protobuf decode failed
    #[error("Protobuf decode error: {0}")]
    ProtobufDecode(#[from] prost::DecodeError),

    /// Response body was already consumed by an earlier call
    #[error("Response body already consumed")]
    BodyConsumed,

    /// Retries are enabled but the request body is a single-use stream
    /// that cannot be replayed on a second attempt
    #[error("Retries require a rewindable body; buffer the stream or disable retries")]
    NonRetryableBody,

    /// Metric registration or collection failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error occurred below the HTTP layer (dial, TLS,
    /// timeout, connection reset) as opposed to a usage or decode error
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Connection(_) | Error::Timeout(_) | Error::Io(_)
        )
    }

    /// Check if this is a response-consumption error
    pub fn is_consumption(&self) -> bool {
        matches!(
            self,
            Error::Json(_) | Error::ProtobufDecode(_) | Error::BodyConsumed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err = Error::Timeout(Duration::from_secs(5));
        assert!(err.is_timeout());
        assert!(err.is_transport());
        assert!(!err.is_consumption());
    }

    #[test]
    fn test_consumption_classification() {
        assert!(Error::BodyConsumed.is_consumption());
        assert!(!Error::BodyConsumed.is_transport());
    }

    #[test]
    fn test_config_constructor() {
        let err = Error::config("bad proxy");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: bad proxy");
    }
}
