//! DNS resolution checker
//!
//! Resolves probe hostnames through hickory, either with the system
//! configuration or with an explicit list of nameservers.

use crate::config::settings::DnsProvider;
use crate::utils::DnsError;
use async_trait::async_trait;
use hickory_proto::xfer::Protocol;
use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::Resolver;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

/// Type alias for the Tokio async resolver
type TokioResolver = Resolver<TokioConnectionProvider>;

/// Turns a hostname into socket addresses to connect to
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, hostname: &str, port: u16) -> Result<Vec<SocketAddr>, DnsError>;
}

/// DNS checker backed by a single hickory resolver
pub struct DnsChecker {
    provider: String,
    resolver: TokioResolver,
}

impl DnsChecker {
    /// Create a checker for the given provider
    pub fn new(provider: &DnsProvider) -> Result<Self, DnsError> {
        let resolver: TokioResolver = if provider.servers.is_empty() {
            // Use system resolver
            TokioResolver::builder_tokio()
                .map_err(|e| DnsError::ResolverSetup {
                    provider: provider.name.clone(),
                    message: e.to_string(),
                })?
                .build()
        } else {
            // Use custom nameservers
            let mut config = ResolverConfig::new();
            for server in &provider.servers {
                let socket_addr = SocketAddr::new(*server, 53);
                config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
            }

            TokioResolver::builder_with_config(config, TokioConnectionProvider::default()).build()
        };

        Ok(Self {
            provider: provider.name.clone(),
            resolver,
        })
    }

    /// Name of the configured provider
    pub fn provider(&self) -> &str {
        &self.provider
    }
}

#[async_trait]
impl Resolve for DnsChecker {
    async fn resolve(&self, hostname: &str, port: u16) -> Result<Vec<SocketAddr>, DnsError> {
        if let Ok(ip) = hostname.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let start = Instant::now();
        let lookup = self
            .resolver
            .lookup_ip(hostname)
            .await
            .map_err(|e| DnsError::ResolutionFailed {
                domain: hostname.to_string(),
                message: e.to_string(),
            })?;

        let addresses: Vec<SocketAddr> = lookup.iter().map(|ip| SocketAddr::new(ip, port)).collect();
        tracing::debug!(
            hostname,
            provider = %self.provider,
            count = addresses.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "resolved"
        );

        if addresses.is_empty() {
            return Err(DnsError::NoRecords {
                domain: hostname.to_string(),
            });
        }
        Ok(addresses)
    }
}

/// Fixed hostname to address table, consulted before (or instead of) DNS
///
/// Hostnames are matched case-insensitively. The configured addresses are
/// used verbatim, including their port.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, Vec<SocketAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `hostname` to `addrs`
    pub fn with_host(mut self, hostname: &str, addrs: Vec<SocketAddr>) -> Self {
        self.entries.insert(hostname.to_ascii_lowercase(), addrs);
        self
    }
}

#[async_trait]
impl Resolve for StaticResolver {
    async fn resolve(&self, hostname: &str, _port: u16) -> Result<Vec<SocketAddr>, DnsError> {
        match self.entries.get(&hostname.to_ascii_lowercase()) {
            Some(addrs) if !addrs.is_empty() => Ok(addrs.clone()),
            Some(_) => Err(DnsError::NoRecords {
                domain: hostname.to_string(),
            }),
            None => Err(DnsError::ResolutionFailed {
                domain: hostname.to_string(),
                message: "no such host".to_string(),
            }),
        }
    }
}
