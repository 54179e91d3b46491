// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response wrapper
//!
//! Status, headers and final URL are copied out at construction, so the
//! metadata accessors never touch the body. The body itself belongs to
//! exactly one consuming method: the first one takes the underlying
//! response (closing it when done or dropped), and every later consuming
//! call fails with [`Error::BodyConsumed`].

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::error::{Error, Result};

/// Response to an executed request
///
/// The body may be read by exactly one of the consuming methods
/// ([`json`](Self::json), [`protobuf`](Self::protobuf),
/// [`text`](Self::text), [`bytes`](Self::bytes),
/// [`discard`](Self::discard), [`write_to_file`](Self::write_to_file),
/// [`write_to`](Self::write_to)); a second consuming call returns
/// [`Error::BodyConsumed`]. Decode failures are never retried.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    inner: Option<reqwest::Response>,
}

impl Response {
    pub(crate) fn new(url: Url, inner: reqwest::Response) -> Self {
        Self {
            status: inner.status(),
            headers: inner.headers().clone(),
            url,
            inner: Some(inner),
        }
    }

    /// Check if the status code is exactly 200; does not consume the body
    pub fn is_status_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Final URL of the exchange (after redirects)
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Borrow the raw underlying response; `None` once the body has been
    /// consumed
    pub fn raw(&self) -> Option<&reqwest::Response> {
        self.inner.as_ref()
    }

    /// Decode the body as JSON into `target`'s type
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let raw = self.take()?;
        let bytes = raw.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Decode the body as a protobuf message
    pub async fn protobuf<M: prost::Message + Default>(&mut self) -> Result<M> {
        let raw = self.take()?;
        let bytes = raw.bytes().await?;
        Ok(M::decode(bytes.as_ref())?)
    }

    /// Read the body as text
    pub async fn text(&mut self) -> Result<String> {
        Ok(self.take()?.text().await?)
    }

    /// Read the body as bytes
    pub async fn bytes(&mut self) -> Result<Bytes> {
        Ok(self.take()?.bytes().await?)
    }

    /// Drain and discard the body, returning the byte count
    pub async fn discard(&mut self) -> Result<u64> {
        let mut raw = self.take()?;
        let mut total = 0u64;
        while let Some(chunk) = raw.chunk().await? {
            total += chunk.len() as u64;
        }
        Ok(total)
    }

    /// Stream the body into a file, returning the byte count
    pub async fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        let raw = self.take()?;
        let mut file = match tokio::fs::File::create(path).await {
            Ok(file) => file,
            Err(err) => {
                drop(raw);
                return Err(err.into());
            }
        };
        let written = copy_body(raw, &mut file).await?;
        file.flush().await?;
        Ok(written)
    }

    /// Stream the body into a writer, returning the byte count
    pub async fn write_to<W: AsyncWrite + Unpin>(&mut self, sink: &mut W) -> Result<u64> {
        copy_body(self.take()?, sink).await
    }

    fn take(&mut self) -> Result<reqwest::Response> {
        self.inner.take().ok_or(Error::BodyConsumed)
    }
}

async fn copy_body<W: AsyncWrite + Unpin>(
    mut raw: reqwest::Response,
    sink: &mut W,
) -> Result<u64> {
    let mut total = 0u64;
    while let Some(chunk) = raw.chunk().await? {
        sink.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }
    Ok(total)
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("consumed", &self.inner.is_none())
            .finish()
    }
}
