// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client core
//!
//! Configuration, request construction, the retry/dispatch loop and the
//! single-consumption response wrapper.

mod body;
mod config;
mod executor;
mod response;

pub use body::Body;
pub use config::{
    ClientConfig, DnsResolverFn, RetryPredicate, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HEADERS,
    DEFAULT_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use executor::{default_should_retry, HttpClient, FILE_FIELD_NAME_KEY};
pub use response::Response;
