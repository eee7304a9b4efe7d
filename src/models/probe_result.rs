//! Probe outcome and result types

use super::{PinSet, Target};
use serde::{Serialize, Serializer};
use std::time::Duration;

fn serialize_duration_ms<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Classification of a single probe
///
/// Variants are declared in severity order, best first. The ordinal is part
/// of the report format: tables, JSON and tests all rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeOutcome {
    /// Handshake succeeded and the leaf CN is allow-listed
    PinnedOk,
    /// Hostname did not resolve
    DnsError,
    /// Resolution, connect or handshake exceeded the time budget
    Timeout,
    /// Connect or handshake failed for any other reason
    TlsError,
    /// Handshake succeeded but the leaf CN is not allow-listed
    CnMismatch,
}

impl ProbeOutcome {
    pub const ALL: [ProbeOutcome; 5] = [
        ProbeOutcome::PinnedOk,
        ProbeOutcome::DnsError,
        ProbeOutcome::Timeout,
        ProbeOutcome::TlsError,
        ProbeOutcome::CnMismatch,
    ];

    /// Sort rank, 0 is best and 4 is the most alarming
    pub fn severity(&self) -> u8 {
        match self {
            ProbeOutcome::PinnedOk => 0,
            ProbeOutcome::DnsError => 1,
            ProbeOutcome::Timeout => 2,
            ProbeOutcome::TlsError => 3,
            ProbeOutcome::CnMismatch => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::PinnedOk => "PINNED_OK",
            ProbeOutcome::DnsError => "DNS_ERROR",
            ProbeOutcome::Timeout => "TIMEOUT",
            ProbeOutcome::TlsError => "TLS_ERROR",
            ProbeOutcome::CnMismatch => "CN_MISMATCH",
        }
    }

    /// Get the icon for this outcome
    pub fn icon(&self) -> &'static str {
        match self {
            ProbeOutcome::PinnedOk => "✓",
            ProbeOutcome::DnsError | ProbeOutcome::Timeout | ProbeOutcome::TlsError => "⚠",
            ProbeOutcome::CnMismatch => "✗✗",
        }
    }

    /// The probe reached the host but it served an unexpected certificate
    pub fn is_security_finding(&self) -> bool {
        matches!(self, ProbeOutcome::CnMismatch)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of probing one [`Target`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub target: Target,
    pub outcome: ProbeOutcome,
    /// Subject CN of the leaf certificate, when a handshake completed
    pub observed_cn: Option<String>,
    /// Wall-clock time of the whole probe (milliseconds when serialized)
    #[serde(serialize_with = "serialize_duration_ms", rename = "elapsed_ms")]
    pub elapsed: Duration,
    /// Human-readable reason for the outcome
    pub detail: Option<String>,
    /// Status of the last response after following redirects from `/`
    pub http_status: Option<u16>,
    /// Where the redirect chain from `/` ended
    pub final_url: Option<String>,
}

impl ProbeResult {
    /// Classify a completed handshake against the pin set
    pub fn from_handshake(
        target: Target,
        observed_cn: Option<String>,
        pins: &PinSet,
        elapsed: Duration,
    ) -> Self {
        let (outcome, detail) = match observed_cn.as_deref() {
            Some(cn) if pins.contains(cn) => {
                (ProbeOutcome::PinnedOk, "certificate pinned".to_string())
            }
            Some(cn) => (ProbeOutcome::CnMismatch, format!("untrusted cert: {}", cn)),
            None => (
                ProbeOutcome::CnMismatch,
                "certificate has no common name".to_string(),
            ),
        };
        Self {
            target,
            outcome,
            observed_cn,
            elapsed,
            detail: Some(detail),
            http_status: None,
            final_url: None,
        }
    }

    /// Attach the landing page reached over HTTP
    pub fn with_landing(mut self, status: u16, final_url: impl Into<String>) -> Self {
        self.http_status = Some(status);
        self.final_url = Some(final_url.into());
        self
    }

    /// A probe that ended before a certificate could be inspected
    pub fn failure(
        target: Target,
        outcome: ProbeOutcome,
        detail: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        debug_assert!(
            !matches!(outcome, ProbeOutcome::PinnedOk | ProbeOutcome::CnMismatch),
            "handshake outcomes carry a certificate"
        );
        Self {
            target,
            outcome,
            observed_cn: None,
            elapsed,
            detail: Some(detail.into()),
            http_status: None,
            final_url: None,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.target.hostname
    }
}
