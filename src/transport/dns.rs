// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DNS resolver override
//!
//! Adapts a caller-supplied host-to-IP function to the resolver interface
//! the transport dials through. The port of the original address is kept;
//! only the host part is substituted.

use std::net::SocketAddr;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use crate::client::DnsResolverFn;

/// Resolver delegating every lookup to a user function
pub(crate) struct OverrideResolver {
    resolve_fn: DnsResolverFn,
}

impl OverrideResolver {
    pub(crate) fn new(resolve_fn: DnsResolverFn) -> Self {
        Self { resolve_fn }
    }
}

impl Resolve for OverrideResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolve_fn = self.resolve_fn.clone();
        Box::pin(async move {
            match resolve_fn(name.as_str()) {
                Ok(ip) => {
                    // port 0 is a placeholder; the dialer applies the real one
                    let addrs: Addrs = Box::new(std::iter::once(SocketAddr::new(ip, 0)));
                    Ok(addrs)
                }
                Err(err) => Err(err.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use crate::error::Error;

    #[tokio::test]
    async fn test_override_resolves_through_function() {
        let resolver = OverrideResolver::new(Arc::new(|host: &str| {
            assert_eq!(host, "service.internal");
            Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
        }));
        let name: Name = "service.internal".parse().unwrap();
        let addrs: Vec<SocketAddr> = resolver.resolve(name).await.unwrap().collect();
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_override_propagates_failure() {
        let resolver = OverrideResolver::new(Arc::new(|host: &str| {
            Err(Error::config(format!("unknown host {}", host)))
        }));
        let name: Name = "missing.internal".parse().unwrap();
        let err = resolver.resolve(name).await.err().unwrap();
        assert!(err.to_string().contains("unknown host missing.internal"));
    }
}
