// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client configuration
//!
//! A `ClientConfig` is assembled with builder methods, handed to
//! [`HttpClient::new`](crate::HttpClient::new) and immutable from then on.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::interceptor::{Interceptor, RequestContext};

/// Default overall request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default idle-connection ceiling per host
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 2;

/// Default user agent sent with the browser-like header set
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/66.0.3359.170 Safari/537.36";

/// Browser-like headers merged in (by addition, not replacement) when
/// [`ClientConfig::enable_default_header`] is set.
///
/// Note: setting Accept-Encoding explicitly would disable automatic
/// decompression, so the set deliberately leaves it out.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
    ),
    ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8,ja;q=0.7"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
    ("user-agent", DEFAULT_USER_AGENT),
];

/// DNS resolver override: maps a hostname to an IP literal
pub type DnsResolverFn = Arc<dyn Fn(&str) -> Result<IpAddr> + Send + Sync>;

/// Retry predicate: decides after an attempt whether another should run
///
/// Receives the attempt's request context, the response (absent on a
/// transport error) and the transport error (absent when a response came
/// back). Returning `false` makes the attempt final.
pub type RetryPredicate =
    Arc<dyn Fn(&RequestContext, Option<&reqwest::Response>, Option<&Error>) -> bool + Send + Sync>;

/// HTTP client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Overall per-call timeout, covering each attempt
    pub timeout: Duration,
    /// Dial timeout
    pub connect_timeout: Duration,
    /// Idle-connection ceiling per host
    pub max_idle_per_host: usize,
    /// Proxy URL routing every request; validated lazily, on first use
    pub proxy: Option<String>,
    /// Number of retries after the first attempt
    pub retry_times: u32,
    /// Close connections after each request instead of pooling them
    pub disable_keep_alive: bool,
    /// Follow redirects automatically
    pub auto_redirect: bool,
    /// Merge the browser-like default header set into every request
    pub enable_default_header: bool,
    /// Dump full requests and responses through `tracing`
    pub debug: bool,
    /// Dial this filesystem path over a Unix-domain socket instead of the
    /// URL authority
    pub unix_socket_path: Option<PathBuf>,
    pub(crate) dns_resolver: Option<DnsResolverFn>,
    pub(crate) cookie_jar: Option<Arc<dyn reqwest::cookie::CookieStore + 'static>>,
    pub(crate) should_retry: Option<RetryPredicate>,
    pub(crate) interceptor: Option<Arc<dyn Interceptor>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            proxy: None,
            retry_times: 0,
            disable_keep_alive: false,
            auto_redirect: true,
            enable_default_header: false,
            debug: false,
            unix_socket_path: None,
            dns_resolver: None,
            cookie_jar: None,
            should_retry: None,
            interceptor: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle-connection ceiling per host
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Route every request through the given proxy URL
    ///
    /// A malformed URL is reported on the first request, not here.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Retry failed calls up to `times` additional attempts
    pub fn with_retry_times(mut self, times: u32) -> Self {
        self.retry_times = times;
        self
    }

    /// Replace the default retry predicate
    pub fn with_retry_predicate(mut self, predicate: RetryPredicate) -> Self {
        self.should_retry = Some(predicate);
        self
    }

    /// Resolve hostnames through the given function instead of system DNS
    pub fn with_dns_resolver(mut self, resolver: DnsResolverFn) -> Self {
        self.dns_resolver = Some(resolver);
        self
    }

    /// Dial the given filesystem path over a Unix-domain socket for every
    /// request, ignoring the URL authority
    pub fn with_unix_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.unix_socket_path = Some(path.into());
        self
    }

    /// Store and send cookies through the given jar
    pub fn with_cookie_jar(mut self, jar: Arc<dyn reqwest::cookie::CookieStore + 'static>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Attach an interceptor invoked around every attempt
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Merge the browser-like default header set into every request
    pub fn enable_default_header(mut self) -> Self {
        self.enable_default_header = true;
        self
    }

    /// Close connections after each request instead of pooling them
    pub fn disable_keep_alive(mut self) -> Self {
        self.disable_keep_alive = true;
        self
    }

    /// Control automatic redirect following
    pub fn with_auto_redirect(mut self, follow: bool) -> Self {
        self.auto_redirect = follow;
        self
    }

    /// Dump full requests and responses through `tracing` at debug level
    pub fn enable_debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_idle_per_host", &self.max_idle_per_host)
            .field("proxy", &self.proxy)
            .field("retry_times", &self.retry_times)
            .field("disable_keep_alive", &self.disable_keep_alive)
            .field("auto_redirect", &self.auto_redirect)
            .field("enable_default_header", &self.enable_default_header)
            .field("debug", &self.debug)
            .field("unix_socket_path", &self.unix_socket_path)
            .field("dns_resolver", &self.dns_resolver.is_some())
            .field("cookie_jar", &self.cookie_jar.is_some())
            .field("should_retry", &self.should_retry.is_some())
            .field("interceptor", &self.interceptor.is_some())
            .finish()
    }
}
