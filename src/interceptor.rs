// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/response interceptor hooks
//!
//! An interceptor is invoked around every send attempt: once before the
//! request goes out (with mutable access, so headers can be injected) and
//! once after the attempt completes, successfully or not. A retried call
//! dispatches the hooks on every attempt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use crate::error::Error;

/// Immutable identity of an outbound request, captured per attempt.
///
/// Hooks and retry predicates receive this instead of the request itself,
/// which is consumed by the transport on send.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request method
    pub method: Method,
    /// Request URL as built (before any redirect)
    pub url: Url,
}

impl RequestContext {
    pub(crate) fn of(request: &reqwest::Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
        }
    }
}

/// Result of a single send attempt, handed to `after_receive`.
///
/// Exactly one of `response` / `error` is set. A non-success status code
/// is a response, not an error.
pub struct Outcome<'a> {
    /// Response received, if the exchange completed
    pub response: Option<&'a reqwest::Response>,
    /// Transport error, if the exchange failed
    pub error: Option<&'a Error>,
    /// Wall-clock duration of this attempt
    pub elapsed: Duration,
}

impl<'a> Outcome<'a> {
    pub(crate) fn new(
        response: Option<&'a reqwest::Response>,
        error: Option<&'a Error>,
        elapsed: Duration,
    ) -> Self {
        Self {
            response,
            error,
            elapsed,
        }
    }

    /// Check whether the attempt reached the server and came back
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Status code of the response, if one was received
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        self.response.map(|r| r.status())
    }
}

/// Hook invoked around every send attempt
///
/// Both methods default to no-ops, so an implementation registers only
/// the capability it needs.
///
/// # Example
///
/// ```rust,no_run
/// use mustekala::Interceptor;
/// use async_trait::async_trait;
///
/// struct AuthInjector {
///     token: String,
/// }
///
/// #[async_trait]
/// impl Interceptor for AuthInjector {
///     async fn before_send(&self, request: &mut reqwest::Request) {
///         request.headers_mut().insert(
///             "authorization",
///             format!("Bearer {}", self.token).parse().unwrap(),
///         );
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Called before an attempt is sent; may modify the request
    async fn before_send(&self, request: &mut reqwest::Request) {
        let _ = request;
    }

    /// Called after an attempt completes, with the response or the error
    async fn after_receive(&self, request: &RequestContext, outcome: &Outcome<'_>) {
        let _ = (request, outcome);
    }
}

/// Interceptor that logs every attempt through `tracing`
#[derive(Debug, Default)]
pub struct RequestLogger;

#[async_trait]
impl Interceptor for RequestLogger {
    async fn before_send(&self, request: &mut reqwest::Request) {
        tracing::info!(
            method = %request.method(),
            url = %request.url(),
            "request"
        );
    }

    async fn after_receive(&self, request: &RequestContext, outcome: &Outcome<'_>) {
        match (outcome.response, outcome.error) {
            (Some(response), _) => tracing::info!(
                url = %request.url,
                status = %response.status(),
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "response"
            ),
            (None, Some(error)) => tracing::warn!(
                url = %request.url,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                error = %error,
                "request failed"
            ),
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_captures_method_and_url() {
        let request = reqwest::Request::new(
            Method::POST,
            Url::parse("https://example.com/api?x=1").unwrap(),
        );
        let ctx = RequestContext::of(&request);
        assert_eq!(ctx.method, Method::POST);
        assert_eq!(ctx.url.as_str(), "https://example.com/api?x=1");
    }

    #[test]
    fn test_outcome_accessors() {
        let err = Error::BodyConsumed;
        let outcome = Outcome::new(None, Some(&err), Duration::from_millis(12));
        assert!(!outcome.is_success());
        assert_eq!(outcome.status(), None);
    }
}
