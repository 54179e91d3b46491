// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client and request execution
//!
//! The client owns one lazily-built transport and runs every call through
//! the same path: build a request template, then dispatch it through the
//! retry loop with interceptor and debug hooks around each attempt.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::channel::mpsc;
use futures::SinkExt;
use once_cell::sync::OnceCell;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

use crate::client::body::Body;
use crate::client::config::{ClientConfig, DEFAULT_HEADERS};
use crate::client::response::Response;
use crate::error::{Error, Result};
use crate::interceptor::{Outcome, RequestContext};
use crate::transport::Transport;

/// First backoff delay; doubles after every attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(300);

/// Reserved upload param key selecting the multipart file field name
pub const FILE_FIELD_NAME_KEY: &str = "_file_field_name";

const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;
const UPLOAD_PIPE_DEPTH: usize = 8;

/// Target for wire-level debug dumps
const WIRE: &str = "mustekala::wire";

/// Result of one send attempt that produced a response
struct Exchange {
    url: Url,
    response: reqwest::Response,
}

/// Configurable outbound HTTP client
///
/// Construct one per configuration and share it: clones reuse the same
/// connection-pooling transport, and concurrent calls are safe since the
/// transport is the only shared state.
///
/// # Example
///
/// ```rust,no_run
/// use mustekala::{Body, ClientConfig, HttpClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = HttpClient::new(ClientConfig::new().with_retry_times(2));
///     let mut response = client
///         .post("https://example.com/api", Body::form([("name", "golang")]), None)
///         .await?;
///     if response.is_status_ok() {
///         println!("{}", response.text().await?);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    config: ClientConfig,
    transport: Arc<OnceCell<Transport>>,
}

impl HttpClient {
    /// Create a client from a finalized configuration
    ///
    /// The transport is built on the first call, so configuration errors
    /// (e.g. a malformed proxy URL) surface there.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: Arc::new(OnceCell::new()),
        }
    }

    /// Create a client with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ClientConfig::default())
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request, appending `params` to the query string
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let url = append_query_params(url, params);
        self.request(Method::GET, &url, Body::Empty, headers).await
    }

    /// Execute a POST request
    ///
    /// Without a caller Content-Type the body is labeled
    /// `application/x-www-form-urlencoded`.
    pub async fn post(&self, url: &str, body: Body, headers: Option<HeaderMap>) -> Result<Response> {
        self.request(Method::POST, url, body, headers).await
    }

    /// Execute a PUT request
    pub async fn put(&self, url: &str, body: Body, headers: Option<HeaderMap>) -> Result<Response> {
        self.request(Method::PUT, url, body, headers).await
    }

    /// Execute a DELETE request
    pub async fn delete(
        &self,
        url: &str,
        body: Body,
        headers: Option<HeaderMap>,
    ) -> Result<Response> {
        self.request(Method::DELETE, url, body, headers).await
    }

    /// POST `data` serialized as JSON, with `Content-Type: application/json`
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        data: &T,
        headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let mut headers = headers.unwrap_or_default();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let payload = serde_json::to_vec(data)?;
        self.request(Method::POST, url, Body::bytes(payload), Some(headers))
            .await
    }

    /// POST an encoded protobuf message, with
    /// `Content-Type: application/x-protobuf`
    pub async fn post_protobuf<M: prost::Message>(
        &self,
        url: &str,
        message: &M,
        headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let mut headers = headers.unwrap_or_default();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-protobuf"),
        );
        self.request(
            Method::POST,
            url,
            Body::bytes(message.encode_to_vec()),
            Some(headers),
        )
        .await
    }

    /// Upload a file as `multipart/form-data` without buffering it
    ///
    /// A producer task streams the multipart body through a bounded pipe
    /// while the POST reads from the other end; the producer terminates
    /// when the call is abandoned. The file field is named `"file"`
    /// unless `params` carries [`FILE_FIELD_NAME_KEY`]; the remaining
    /// params are written as ordinary string fields. Read errors on
    /// `reader` truncate the pipe and surface as a transport error.
    ///
    /// The multipart body is a single-use stream, so uploads cannot be
    /// combined with configured retries ([`Error::NonRetryableBody`]).
    pub async fn upload_file<R>(
        &self,
        url: &str,
        reader: R,
        filename: &str,
        headers: Option<HeaderMap>,
        params: HashMap<String, String>,
    ) -> Result<Response>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let boundary: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(30)
            .map(char::from)
            .collect();
        let field_name = params
            .get(FILE_FIELD_NAME_KEY)
            .cloned()
            .unwrap_or_else(|| "file".to_string());

        let (tx, rx) = mpsc::channel(UPLOAD_PIPE_DEPTH);
        tokio::spawn(write_multipart(
            tx,
            reader,
            boundary.clone(),
            field_name,
            filename.to_string(),
            params,
        ));

        let mut headers = headers.unwrap_or_default();
        let content_type = format!("multipart/form-data; boundary={}", boundary);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&content_type).map_err(|e| Error::config(e.to_string()))?,
        );

        self.request(Method::POST, url, Body::from_stream(rx), Some(headers))
            .await
    }

    /// Build and dispatch a request with an arbitrary method
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Body,
        headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let template = self.build(method, url, body, headers)?;
        self.dispatch(template).await
    }

    /// Build the request template sent (or cloned) by every attempt
    ///
    /// A caller-supplied `Host` header rides through untouched and
    /// overrides the URL authority on the wire, for virtual hosting.
    fn build(
        &self,
        method: Method,
        url: &str,
        body: Body,
        headers: Option<HeaderMap>,
    ) -> Result<reqwest::Request> {
        let url = Url::parse(url)?;
        let mut headers = headers.unwrap_or_default();
        if method != Method::GET && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        if self.config.enable_default_header {
            // appended, not inserted: caller values and defaults coexist
            for &(name, value) in DEFAULT_HEADERS {
                headers.append(name, HeaderValue::from_static(value));
            }
        }

        let mut request = reqwest::Request::new(method, url);
        *request.headers_mut() = headers;
        *request.body_mut() = body.into_reqwest();
        Ok(request)
    }

    /// The retry loop
    ///
    /// Runs `1 + retry_times` attempts at most. Each attempt dispatches
    /// the interceptor and debug hooks; when retries are configured the
    /// retry predicate decides after each attempt whether the outcome is
    /// final. Backoff doubles from 300ms between attempts. A non-200
    /// final status is returned as a normal response; only a transport
    /// error on the last attempt fails the call.
    async fn dispatch(&self, template: reqwest::Request) -> Result<Response> {
        let transport = self.transport()?;
        let retries = self.config.retry_times;
        let exec_times = retries as usize + 1;
        // a single-use stream cannot be replayed on a second attempt
        if retries > 0 && template.try_clone().is_none() {
            return Err(Error::NonRetryableBody);
        }

        let mut template = Some(template);
        let mut delay = RETRY_BASE_DELAY;
        let mut last: Option<Result<Exchange>> = None;

        for attempt in 0..exec_times {
            let is_last = attempt + 1 == exec_times;
            // earlier attempts send a clone; the final attempt sends the
            // template itself so single-shot bodies need no copy
            let Some(mut request) = (if is_last {
                template.take()
            } else {
                template.as_ref().and_then(reqwest::Request::try_clone)
            }) else {
                return Err(Error::NonRetryableBody);
            };

            if let Some(interceptor) = &self.config.interceptor {
                interceptor.before_send(&mut request).await;
            }
            self.dump_request(&request);

            let ctx = RequestContext::of(&request);
            // release the previous attempt's connection before re-sending
            drop(last.take());
            let started = Instant::now();
            let executed = transport.execute(request).await;
            let elapsed = started.elapsed();

            let outcome = match executed {
                Ok(response) => {
                    if let Some(interceptor) = &self.config.interceptor {
                        let outcome = Outcome::new(Some(&response), None, elapsed);
                        interceptor.after_receive(&ctx, &outcome).await;
                    }
                    let url = response.url().clone();
                    self.dump_response(response)
                        .await
                        .map(|response| Exchange { url, response })
                }
                Err(err) => {
                    if let Some(interceptor) = &self.config.interceptor {
                        let outcome = Outcome::new(None, Some(&err), elapsed);
                        interceptor.after_receive(&ctx, &outcome).await;
                    }
                    if self.config.debug {
                        tracing::debug!(target: WIRE, error = %err, "response");
                    }
                    Err(err)
                }
            };

            let finished = retries == 0 || !self.consult_retry(&ctx, &outcome);
            last = Some(outcome);
            if finished || is_last {
                break;
            }

            tracing::debug!(
                url = %ctx.url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        match last {
            Some(Ok(exchange)) => Ok(Response::new(exchange.url, exchange.response)),
            Some(Err(err)) => Err(err),
            None => Err(Error::config("request dispatched zero attempts")),
        }
    }

    fn consult_retry(&self, ctx: &RequestContext, outcome: &Result<Exchange>) -> bool {
        let (response, error) = match outcome {
            Ok(exchange) => (Some(&exchange.response), None),
            Err(err) => (None, Some(err)),
        };
        match &self.config.should_retry {
            Some(predicate) => predicate(ctx, response, error),
            None => default_should_retry(ctx, response, error),
        }
    }

    fn transport(&self) -> Result<&Transport> {
        self.transport
            .get_or_try_init(|| Transport::build(&self.config))
    }

    fn dump_request(&self, request: &reqwest::Request) {
        if !self.config.debug {
            return;
        }
        let body = request
            .body()
            .and_then(|body| body.as_bytes())
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        tracing::debug!(
            target: WIRE,
            method = %request.method(),
            url = %request.url(),
            headers = ?request.headers(),
            body = %body,
            "request"
        );
    }

    /// Dump the response when debug is enabled
    ///
    /// The body must be buffered to appear in the dump, so the response
    /// is rebuilt over the buffered bytes; consumption semantics for the
    /// caller are unchanged.
    async fn dump_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if !self.config.debug {
            return Ok(response);
        }
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        tracing::debug!(
            target: WIRE,
            status = %status,
            headers = ?headers,
            body = %String::from_utf8_lossy(&bytes),
            "response"
        );

        let mut builder = http::Response::builder().status(status).version(version);
        if let Some(slot) = builder.headers_mut() {
            *slot = headers;
        }
        let rebuilt = builder
            .body(bytes)
            .map_err(|e| Error::config(e.to_string()))?;
        Ok(reqwest::Response::from(rebuilt))
    }
}

/// Default retry policy: retry on any transport error, a missing
/// response, or any status other than 200
pub fn default_should_retry(
    _request: &RequestContext,
    response: Option<&reqwest::Response>,
    error: Option<&Error>,
) -> bool {
    if error.is_some() {
        return true;
    }
    match response {
        None => true,
        Some(response) => response.status() != reqwest::StatusCode::OK,
    }
}

/// Append encoded params to a URL, preserving any existing `?`/`&`
fn append_query_params(url: &str, params: &[(&str, &str)]) -> String {
    if url.is_empty() || params.is_empty() {
        return url.to_string();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let mut out = url.to_string();
    if out.contains('?') {
        if !out.ends_with('?') {
            out.push('&');
        }
    } else {
        out.push('?');
    }
    out.push_str(&encoded);
    out
}

/// Producer side of the upload pipe
///
/// Writes the multipart preamble, the file part, the string fields and
/// the closing boundary. Every send blocks while the pipe is full, so a
/// slow POST backpressures the reader; a dropped receiver ends the task.
async fn write_multipart<R>(
    mut tx: mpsc::Sender<std::result::Result<Bytes, std::io::Error>>,
    mut reader: R,
    boundary: String,
    field_name: String,
    filename: String,
    params: HashMap<String, String>,
) where
    R: AsyncRead + Send + Unpin,
{
    let preamble = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        boundary,
        escape_quotes(&field_name),
        escape_quotes(&filename),
    );
    if tx.send(Ok(Bytes::from(preamble))).await.is_err() {
        return;
    }

    let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(Ok(Bytes::copy_from_slice(&buf[..n]))).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                // truncates the pipe; the POST sees a transport error
                let _ = tx.send(Err(err)).await;
                return;
            }
        }
    }

    let mut tail = String::new();
    for (key, value) in &params {
        if key == FILE_FIELD_NAME_KEY {
            continue;
        }
        tail.push_str(&format!(
            "\r\n--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
            boundary,
            escape_quotes(key),
            value
        ));
    }
    tail.push_str(&format!("\r\n--{}--\r\n", boundary));
    let _ = tx.send(Ok(Bytes::from(tail))).await;
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
