// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport construction
//!
//! One transport is built per client, lazily on first use, and reused for
//! the client's lifetime so connections pool. Dial strategy priority:
//! a configured Unix-socket path wins over everything, then a DNS
//! resolver override, then plain TCP.

mod dns;
#[cfg(unix)]
mod unix;

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use url::Url;

use crate::client::ClientConfig;
use crate::error::{Error, Result};

/// Idle pooled connections are dropped after this long
const IDLE_CONN_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP keep-alive probe interval
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Redirect ceiling when auto-redirect is enabled
const MAX_REDIRECTS: usize = 10;

/// Connection-pooling transport beneath the request/response cycle
#[derive(Debug)]
pub(crate) enum Transport {
    /// reqwest client: TCP dialing, proxying, pooling, TLS
    Tcp(reqwest::Client),
    /// Fixed-path Unix-domain-socket dialing
    #[cfg(unix)]
    Unix(unix::UnixTransport),
}

impl Transport {
    /// Build a transport from the client configuration.
    ///
    /// Errors here (malformed proxy URL, client build failure) surface on
    /// the request that triggered construction, not at configuration time.
    pub(crate) fn build(config: &ClientConfig) -> Result<Self> {
        if let Some(path) = &config.unix_socket_path {
            #[cfg(unix)]
            {
                return Ok(Transport::Unix(unix::UnixTransport::new(
                    path.clone(),
                    config.connect_timeout,
                    config.timeout,
                )));
            }
            #[cfg(not(unix))]
            {
                let _ = path;
                return Err(Error::config(
                    "unix-socket dialing is not supported on this platform",
                ));
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(IDLE_CONN_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .redirect(if config.auto_redirect {
                Policy::limited(MAX_REDIRECTS)
            } else {
                Policy::none()
            });

        // disabling keep-alive means no connection outlives its request
        builder = if config.disable_keep_alive {
            builder.pool_max_idle_per_host(0)
        } else {
            builder.pool_max_idle_per_host(config.max_idle_per_host)
        };

        if let Some(proxy_url) = &config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        if let Some(resolver) = &config.dns_resolver {
            builder = builder.dns_resolver(Arc::new(dns::OverrideResolver::new(resolver.clone())));
        }

        if let Some(jar) = &config.cookie_jar {
            builder = builder.cookie_provider(Arc::new(JarHandle(jar.clone())));
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Transport::Tcp(client))
    }

    /// Execute one attempt on this transport
    pub(crate) async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        match self {
            Transport::Tcp(client) => Ok(client.execute(request).await?),
            #[cfg(unix)]
            Transport::Unix(transport) => transport.execute(request).await,
        }
    }
}

/// Adapter exposing a shared cookie jar under the concrete type
/// `cookie_provider` requires
struct JarHandle(Arc<dyn CookieStore + 'static>);

impl CookieStore for JarHandle {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.0.set_cookies(cookie_headers, url)
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.0.cookies(url)
    }
}
