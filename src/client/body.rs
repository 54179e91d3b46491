// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body variants
//!
//! The accepted body shapes form a closed set. Constructing one is
//! explicit, so an unsupported payload type is unrepresentable rather
//! than a runtime failure.

use bytes::Bytes;

/// Outbound request body
///
/// `Stream` is single-use: it can be read start-to-end exactly once and
/// cannot be rewound, so it is rejected when retries are enabled.
#[derive(Debug)]
pub enum Body {
    /// No body
    Empty,
    /// UTF-8 text, sent as-is
    Text(String),
    /// Raw bytes, sent as-is
    Bytes(Bytes),
    /// Key/value pairs, sent `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    /// Single-use byte stream
    Stream(reqwest::Body),
}

impl Body {
    /// Body from text
    pub fn text(text: impl Into<String>) -> Self {
        Body::Text(text.into())
    }

    /// Body from raw bytes
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Body::Bytes(bytes.into())
    }

    /// Body from form key/value pairs
    pub fn form<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Body::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Body from a single-use byte stream
    ///
    /// The stream cannot be replayed: a client configured with retries
    /// rejects it with [`Error::NonRetryableBody`](crate::Error) before
    /// the first attempt.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: futures::TryStream + Send + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        Body::Stream(reqwest::Body::wrap_stream(stream))
    }

    /// Convert into the transport body, if any
    pub(crate) fn into_reqwest(self) -> Option<reqwest::Body> {
        match self {
            Body::Empty => None,
            Body::Text(text) => Some(reqwest::Body::from(text)),
            Body::Bytes(bytes) => Some(reqwest::Body::from(bytes)),
            Body::Form(pairs) => Some(reqwest::Body::from(encode_form(&pairs))),
            Body::Stream(body) => Some(body),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

/// Encode key/value pairs as `application/x-www-form-urlencoded`
pub(crate) fn encode_form(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}
