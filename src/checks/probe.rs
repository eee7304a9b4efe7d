//! Probe unit
//!
//! One probe resolves a hostname, connects, completes a TLS handshake and
//! compares the leaf certificate's CN with the pin set. When an HTTP checker
//! is attached, the landing page is fetched with whatever budget is left.
//! Every failure is folded into the returned [`ProbeResult`]; nothing here
//! returns an error.

use super::{CertificateChecker, HttpChecker, Resolve, SslChecker, TcpChecker};
use crate::models::{PinSet, ProbeOutcome, ProbeResult, Target};
use crate::utils::{DnsError, SslError, TcpError, ToolkitError};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something that can classify a single target
///
/// Implementations must not share mutable state between calls: the worker
/// pool runs many probes at once without synchronisation.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Target, timeout: Duration, pins: &PinSet) -> ProbeResult;
}

/// Production probe: DNS, TCP and a rustls handshake
pub struct TlsProbe {
    resolver: Arc<dyn Resolve>,
    port: u16,
    tcp: TcpChecker,
    ssl: SslChecker,
    certificates: CertificateChecker,
    http: Option<HttpChecker>,
}

/// What a completed handshake revealed
struct Observation {
    common_name: Option<String>,
    addr: SocketAddr,
}

impl TlsProbe {
    pub fn new(resolver: Arc<dyn Resolve>, port: u16) -> Result<Self, SslError> {
        Ok(Self {
            resolver,
            port,
            tcp: TcpChecker::new(),
            ssl: SslChecker::new()?,
            certificates: CertificateChecker::new(),
            http: None,
        })
    }

    /// Follow redirects from `/` after each successful handshake
    pub fn with_http(mut self, http: HttpChecker) -> Self {
        self.http = Some(http);
        self
    }

    /// Steps 1-3: everything up to the observed CN
    async fn observe(&self, target: &Target) -> Result<Observation, ToolkitError> {
        let server_name =
            SslChecker::server_name(&target.hostname).map_err(|_| DnsError::InvalidDomain {
                domain: target.hostname.clone(),
            })?;

        let addrs = self.resolver.resolve(&target.hostname, self.port).await?;
        let stream = self.tcp.connect(&addrs).await?;
        let addr = stream.peer_addr().map_err(|e| TcpError::ConnectionFailed {
            addr: addrs[0],
            message: e.to_string(),
        })?;
        let chain = self.ssl.handshake(server_name, stream).await?;
        let common_name = self.certificates.leaf_common_name(&chain)?;
        Ok(Observation { common_name, addr })
    }

    /// Step 4: record the landing page, leaving the result untouched on failure
    async fn land(&self, result: ProbeResult, addr: SocketAddr, remaining: Duration) -> ProbeResult {
        let Some(http) = &self.http else {
            return result;
        };
        if remaining.is_zero() {
            return result;
        }

        let fetched =
            tokio::time::timeout(remaining, http.fetch(result.hostname(), addr, remaining)).await;
        match fetched {
            Ok(Ok(landing)) => result.with_landing(landing.status, landing.final_url),
            Ok(Err(e)) => {
                tracing::debug!(hostname = %result.hostname(), error = %e, "landing page unavailable");
                result
            }
            Err(_) => {
                tracing::debug!(hostname = %result.hostname(), "landing page ran out of time");
                result
            }
        }
    }
}

#[async_trait]
impl Probe for TlsProbe {
    async fn probe(&self, target: &Target, timeout: Duration, pins: &PinSet) -> ProbeResult {
        let start = Instant::now();
        let observed = tokio::time::timeout(timeout, self.observe(target)).await;

        let result = match observed {
            Ok(Ok(observation)) => {
                let result = ProbeResult::from_handshake(
                    target.clone(),
                    observation.common_name,
                    pins,
                    start.elapsed(),
                );
                let remaining = timeout.saturating_sub(start.elapsed());
                let mut result = self.land(result, observation.addr, remaining).await;
                result.elapsed = start.elapsed();
                result
            }
            Ok(Err(e)) => {
                tracing::debug!(hostname = %target.hostname, error = %e, "probe step failed");
                ProbeResult::failure(target.clone(), classify(&e), reason(&e), start.elapsed())
            }
            Err(_) => timed_out(target, timeout, start.elapsed()),
        };

        tracing::debug!(
            hostname = %target.hostname,
            outcome = %result.outcome,
            cn = result.observed_cn.as_deref().unwrap_or("-"),
            status = result.http_status.unwrap_or_default(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "probe finished"
        );
        result
    }
}

/// Result for a probe whose budget ran out
pub fn timed_out(target: &Target, timeout: Duration, elapsed: Duration) -> ProbeResult {
    ProbeResult::failure(
        target.clone(),
        ProbeOutcome::Timeout,
        format!("timeout after {:.1}s", timeout.as_secs_f64()),
        elapsed,
    )
}

/// Map a step failure onto the outcome taxonomy
fn classify(err: &ToolkitError) -> ProbeOutcome {
    match err {
        ToolkitError::Dns(_) => ProbeOutcome::DnsError,
        // refused, reset, protocol alerts, unparsable leaf
        _ => ProbeOutcome::TlsError,
    }
}

/// Short reason shown next to a failed outcome
fn reason(err: &ToolkitError) -> &'static str {
    match err {
        ToolkitError::Dns(_) => "no dns",
        ToolkitError::Tcp(TcpError::ConnectionRefused { .. }) => "connection refused",
        ToolkitError::Tcp(TcpError::ConnectionReset { .. }) => "connection reset",
        ToolkitError::Tcp(TcpError::HostUnreachable { .. } | TcpError::NetworkUnreachable) => {
            "unreachable"
        }
        ToolkitError::Tcp(_) => "connection error",
        ToolkitError::Ssl(SslError::NoPeerCertificate) => "no tls available",
        ToolkitError::Ssl(_) => "tls handshake failed",
        ToolkitError::Certificate(_) => "unreadable certificate",
        ToolkitError::Config(_) | ToolkitError::Extension(_) => "request error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::StaticResolver;
    use crate::utils::CertificateError;

    #[test]
    fn test_classify() {
        let dns: ToolkitError = DnsError::NoRecords {
            domain: "x".to_string(),
        }
        .into();
        assert_eq!(classify(&dns), ProbeOutcome::DnsError);

        let tcp: ToolkitError = TcpError::ConnectionRefused {
            addr: "127.0.0.1:443".parse().unwrap(),
        }
        .into();
        assert_eq!(classify(&tcp), ProbeOutcome::TlsError);

        let cert: ToolkitError = CertificateError::EmptyChain.into();
        assert_eq!(classify(&cert), ProbeOutcome::TlsError);
    }

    #[test]
    fn test_reasons_are_short() {
        let addr: SocketAddr = "127.0.0.1:443".parse().unwrap();
        let cases: Vec<(ToolkitError, &str)> = vec![
            (
                DnsError::ResolutionFailed {
                    domain: "interactivebrokers.va".to_string(),
                    message: "no record found".to_string(),
                }
                .into(),
                "no dns",
            ),
            (TcpError::ConnectionRefused { addr }.into(), "connection refused"),
            (TcpError::ConnectionReset { addr }.into(), "connection reset"),
            (TcpError::NetworkUnreachable.into(), "unreachable"),
            (TcpError::NoAddresses.into(), "connection error"),
            (
                SslError::HandshakeFailed {
                    message: "received fatal alert: HandshakeFailure".to_string(),
                }
                .into(),
                "tls handshake failed",
            ),
            (SslError::NoPeerCertificate.into(), "no tls available"),
            (CertificateError::EmptyChain.into(), "unreadable certificate"),
        ];
        for (err, expected) in cases {
            assert_eq!(reason(&err), expected, "{}", err);
        }
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_dns_error() {
        let probe = TlsProbe::new(Arc::new(StaticResolver::new()), 443).unwrap();
        let result = probe
            .probe(
                &Target::known("interactivebrokers.nowhere"),
                Duration::from_secs(1),
                &PinSet::default(),
            )
            .await;
        assert_eq!(result.outcome, ProbeOutcome::DnsError);
        assert!(result.observed_cn.is_none());
    }

    #[tokio::test]
    async fn test_invalid_hostname_is_dns_error() {
        let probe = TlsProbe::new(Arc::new(StaticResolver::new()), 443).unwrap();
        let result = probe
            .probe(
                &Target::known("not a hostname"),
                Duration::from_secs(1),
                &PinSet::default(),
            )
            .await;
        assert_eq!(result.outcome, ProbeOutcome::DnsError);
    }

    #[tokio::test]
    async fn test_refused_connection_is_tls_error() {
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let resolver = StaticResolver::new().with_host("interactivebrokers.de", vec![addr]);
        let probe = TlsProbe::new(Arc::new(resolver), addr.port()).unwrap();

        let result = probe
            .probe(
                &Target::known("interactivebrokers.de"),
                Duration::from_secs(2),
                &PinSet::default(),
            )
            .await;
        assert_eq!(result.outcome, ProbeOutcome::TlsError);
        assert_eq!(result.detail.as_deref(), Some("connection refused"));
    }
}
