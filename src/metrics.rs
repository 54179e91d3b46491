// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request metrics
//!
//! A counter keyed by (host, path, success|failure) and a latency
//! histogram keyed by (host, path), registered in the default prometheus
//! registry. Attach the collector to a client with
//! [`ClientConfig::with_interceptor`](crate::ClientConfig::with_interceptor);
//! it records every attempt on completion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts};
use url::Url;

use crate::error::Result;
use crate::interceptor::{Interceptor, Outcome, RequestContext};

/// Latency histogram buckets, in seconds
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 3.0, 5.0, 10.0];

/// URL normalization hook applied before labeling
///
/// Collapse high-cardinality path segments (numeric IDs, tokens) here so
/// they never become metric label values.
pub type UrlFormatter = Arc<dyn Fn(&mut Url) + Send + Sync>;

/// Outbound request metrics collector
pub struct Metrics {
    format_url: Option<UrlFormatter>,
    request_total: CounterVec,
    request_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Create and register the collectors in the default registry
    ///
    /// Fails if collectors with the same namespace/subsystem are already
    /// registered.
    pub fn new(
        namespace: &str,
        subsystem: &str,
        format_url: Option<UrlFormatter>,
    ) -> Result<Self> {
        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_client_request_duration_seconds",
                "http client request duration seconds",
            )
            .namespace(namespace)
            .subsystem(subsystem)
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["host", "path"],
        )?;
        prometheus::register(Box::new(request_duration_seconds.clone()))?;

        let request_total = CounterVec::new(
            Opts::new("http_client_request_total", "http client request total")
                .namespace(namespace)
                .subsystem(subsystem),
            &["host", "path", "status"],
        )?;
        prometheus::register(Box::new(request_total.clone()))?;

        Ok(Self {
            format_url,
            request_total,
            request_duration_seconds,
        })
    }

    /// Record one call outcome
    pub fn count(&self, url: &Url, success: bool) {
        let url = self.labeled(url);
        let status = if success { "success" } else { "failure" };
        self.request_total
            .with_label_values(&[url.host_str().unwrap_or(""), url.path(), status])
            .inc();
    }

    /// Record one call latency
    pub fn latency(&self, url: &Url, elapsed: Duration) {
        let url = self.labeled(url);
        self.request_duration_seconds
            .with_label_values(&[url.host_str().unwrap_or(""), url.path()])
            .observe(elapsed.as_secs_f64());
    }

    fn labeled(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(format_url) = &self.format_url {
            format_url(&mut url);
        }
        url
    }
}

#[async_trait]
impl Interceptor for Metrics {
    async fn after_receive(&self, request: &RequestContext, outcome: &Outcome<'_>) {
        self.count(&request.url, outcome.is_success());
        self.latency(&request.url, outcome.elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_value(family_name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        prometheus::gather()
            .iter()
            .find(|family| family.get_name() == family_name)
            .and_then(|family| {
                family
                    .get_metric()
                    .iter()
                    .find(|metric| {
                        labels.iter().all(|(name, value)| {
                            metric.get_label().iter().any(|pair| {
                                pair.get_name() == *name && pair.get_value() == *value
                            })
                        })
                    })
                    .map(|metric| metric.get_counter().value())
            })
    }

    #[test]
    fn test_count_by_outcome() {
        let metrics = Metrics::new("mustekala_test_count", "client", None).unwrap();
        let url = Url::parse("http://api.example.com/items").unwrap();
        metrics.count(&url, true);
        metrics.count(&url, true);
        metrics.count(&url, false);

        let success = counter_value(
            "mustekala_test_count_client_http_client_request_total",
            &[
                ("host", "api.example.com"),
                ("path", "/items"),
                ("status", "success"),
            ],
        );
        assert_eq!(success, Some(2.0));

        let failure = counter_value(
            "mustekala_test_count_client_http_client_request_total",
            &[("status", "failure")],
        );
        assert_eq!(failure, Some(1.0));
    }

    #[test]
    fn test_format_url_collapses_labels() {
        let formatter: UrlFormatter = Arc::new(|url: &mut Url| {
            url.set_path("/items/:id");
        });
        let metrics =
            Metrics::new("mustekala_test_format", "client", Some(formatter)).unwrap();
        metrics.count(
            &Url::parse("http://api.example.com/items/12345").unwrap(),
            true,
        );

        let collapsed = counter_value(
            "mustekala_test_format_client_http_client_request_total",
            &[("path", "/items/:id")],
        );
        assert_eq!(collapsed, Some(1.0));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        Metrics::new("mustekala_test_dup", "client", None).unwrap();
        assert!(Metrics::new("mustekala_test_dup", "client", None).is_err());
    }

    #[tokio::test]
    async fn test_records_through_interceptor_hook() {
        let metrics = Metrics::new("mustekala_test_hook", "client", None).unwrap();
        let request = reqwest::Request::new(
            reqwest::Method::GET,
            Url::parse("http://api.example.com/ping").unwrap(),
        );
        let ctx = RequestContext::of(&request);
        let outcome = Outcome::new(None, None, Duration::from_millis(40));
        metrics.after_receive(&ctx, &outcome).await;

        let total = counter_value(
            "mustekala_test_hook_client_http_client_request_total",
            &[("path", "/ping")],
        );
        assert_eq!(total, Some(1.0));
    }
}
