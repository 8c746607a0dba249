//! Hostname resolution through one fixed plain-DNS server.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::trace;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

type BoxError = Box<dyn Error + Send + Sync>;

/// Resolver handed to reqwest so fetches bypass the system resolver.
pub(crate) struct NameServerResolver {
    resolver: Arc<TokioAsyncResolver>,
}

impl NameServerResolver {
    pub(crate) fn new(server: SocketAddr, timeout: Duration) -> Self {
        let group = NameServerConfigGroup::from_ips_clear(&[server.ip()], server.port(), true);
        let config = ResolverConfig::from_parts(None, Vec::new(), group);
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        NameServerResolver {
            resolver: Arc::new(TokioAsyncResolver::tokio(config, opts)),
        }
    }
}

impl Resolve for NameServerResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            trace!("resolving {}", name.as_str());
            let lookup = resolver
                .lookup_ip(name.as_str())
                .await
                .map_err(|e| Box::new(e) as BoxError)?;
            // reqwest fills in the port of the request
            let addrs: Vec<SocketAddr> = lookup.iter().map(|ip| SocketAddr::new(ip, 0)).collect();
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}
