use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use super::{DnsOutcome, DnsSignal};
use crate::error::ScoutError;
use crate::utils::is_transport_safe;

/// Default timeout for DNS queries.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// DNS resolver for the existence check.
///
/// Uses Google DNS by default, or a single custom nameserver. A fresh
/// hickory resolver is built per lookup so concurrent probes share nothing.
#[derive(Debug, Clone)]
pub struct DnsResolver {
    timeout: Duration,
    nameserver: Option<String>,
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsResolver {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            nameserver: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query this nameserver IP instead of the public default.
    pub fn with_nameserver(mut self, nameserver: Option<String>) -> Self {
        self.nameserver = nameserver;
        self
    }

    fn create_resolver(&self) -> Result<TokioAsyncResolver, ScoutError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;
        opts.use_hosts_file = false;

        let config = if let Some(ns) = &self.nameserver {
            let ip: IpAddr = ns
                .parse()
                .map_err(|_| ScoutError::config(format!("invalid nameserver IP: {}", ns)))?;

            let mut config = ResolverConfig::new();
            config.add_name_server(NameServerConfig::new(
                SocketAddr::new(ip, 53),
                Protocol::Udp,
            ));
            config
        } else {
            ResolverConfig::google()
        };

        Ok(TokioAsyncResolver::tokio(config, opts))
    }
}

#[async_trait]
impl DnsSignal for DnsResolver {
    async fn resolve(&self, domain: &str) -> DnsOutcome {
        if !is_transport_safe(domain) {
            return DnsOutcome::Failed(format!("'{}' is not a valid DNS name", domain));
        }

        let resolver = match self.create_resolver() {
            Ok(resolver) => resolver,
            Err(e) => return DnsOutcome::Failed(e.to_string()),
        };

        // Trailing dot: never apply search domains to a candidate.
        let fqdn = format!("{}.", domain);
        let lookup = tokio::time::timeout(self.timeout, resolver.lookup_ip(fqdn.as_str())).await;

        match lookup {
            Ok(Ok(ips)) => {
                let addrs: Vec<IpAddr> = ips.iter().collect();
                debug!(domain = %domain, count = addrs.len(), "DNS resolved");
                if addrs.is_empty() {
                    DnsOutcome::NotFound
                } else {
                    DnsOutcome::Resolved(addrs)
                }
            }
            Ok(Err(e)) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => {
                    debug!(domain = %domain, "DNS name not found");
                    DnsOutcome::NotFound
                }
                _ => {
                    debug!(domain = %domain, error = %e, "DNS lookup failed");
                    DnsOutcome::Failed(e.to_string())
                }
            },
            Err(_) => DnsOutcome::Failed(format!("DNS lookup timed out after {:?}", self.timeout)),
        }
    }
}
