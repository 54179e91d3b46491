// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Unix-domain-socket transport
//!
//! Every request dials the configured filesystem path, regardless of the
//! URL authority; the URL still supplies the Host header and path. The
//! exchange runs over a dedicated http1 connection per request.

use std::path::PathBuf;
use std::time::Duration;

use futures::TryStreamExt;
use http::header::{HeaderValue, HOST};
use http_body_util::BodyStream;
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use url::Url;

use crate::error::{Error, Result};

/// Fixed-path Unix-domain-socket transport
#[derive(Debug)]
pub(crate) struct UnixTransport {
    path: PathBuf,
    connect_timeout: Duration,
    timeout: Duration,
}

impl UnixTransport {
    pub(crate) fn new(path: PathBuf, connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            path,
            connect_timeout,
            timeout,
        }
    }

    /// Execute one attempt over the socket, bounded by the overall timeout
    pub(crate) async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, mut request: reqwest::Request) -> Result<reqwest::Response> {
        let url = request.url().clone();

        let stream = tokio::time::timeout(self.connect_timeout, UnixStream::connect(&self.path))
            .await
            .map_err(|_| Error::Timeout(self.connect_timeout))??;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                tracing::debug!(error = %err, "unix socket connection closed");
            }
        });

        let body = request
            .body_mut()
            .take()
            .unwrap_or_else(|| reqwest::Body::from(Vec::new()));

        let mut outbound = http::Request::builder()
            .method(request.method().clone())
            .uri(origin_form(&url))
            .body(body)
            .map_err(|e| Error::config(e.to_string()))?;
        *outbound.headers_mut() = request.headers().clone();
        if !outbound.headers().contains_key(HOST) {
            if let Some(authority) = authority_of(&url) {
                let value = HeaderValue::from_str(&authority)
                    .map_err(|e| Error::config(e.to_string()))?;
                outbound.headers_mut().insert(HOST, value);
            }
        }

        let response = sender.send_request(outbound).await?;
        let (parts, incoming) = response.into_parts();
        let body = reqwest::Body::wrap_stream(
            BodyStream::new(incoming)
                .try_filter_map(|frame| std::future::ready(Ok(frame.into_data().ok()))),
        );

        Ok(reqwest::Response::from(http::Response::from_parts(
            parts, body,
        )))
    }
}

/// Path plus query, the request-target form http1 expects
fn origin_form(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn authority_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
