//! Aggregated, deterministically ordered probe report

use super::{ProbeOutcome, ProbeResult, Tier};
use serde::Serialize;

/// Counts per outcome across a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub pinned_ok: usize,
    pub dns_error: usize,
    pub timeout: usize,
    pub tls_error: usize,
    pub cn_mismatch: usize,
}

impl ReportSummary {
    fn record(&mut self, outcome: ProbeOutcome) {
        self.total += 1;
        match outcome {
            ProbeOutcome::PinnedOk => self.pinned_ok += 1,
            ProbeOutcome::DnsError => self.dns_error += 1,
            ProbeOutcome::Timeout => self.timeout += 1,
            ProbeOutcome::TlsError => self.tls_error += 1,
            ProbeOutcome::CnMismatch => self.cn_mismatch += 1,
        }
    }

    /// Probes that did not complete a handshake
    pub fn unreachable(&self) -> usize {
        self.dns_error + self.timeout + self.tls_error
    }

    /// No host served an unexpected certificate
    pub fn is_clean(&self) -> bool {
        self.cn_mismatch == 0
    }
}

/// Probe results sorted by (tier, outcome severity, hostname)
///
/// The order depends only on the set of results, never on the order in
/// which the worker pool produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    results: Vec<ProbeResult>,
    summary: ReportSummary,
}

impl Report {
    /// Build the report from results in any order
    pub fn aggregate(results: impl IntoIterator<Item = ProbeResult>) -> Self {
        let mut results: Vec<ProbeResult> = results.into_iter().collect();
        results.sort_by(|a, b| {
            (a.target.tier, a.outcome.severity(), a.hostname())
                .cmp(&(b.target.tier, b.outcome.severity(), b.hostname()))
                // Only reachable with duplicate hostnames; keeps the order total.
                .then_with(|| a.observed_cn.cmp(&b.observed_cn))
                .then_with(|| a.elapsed.cmp(&b.elapsed))
                .then_with(|| a.detail.cmp(&b.detail))
        });

        let mut summary = ReportSummary::default();
        for result in &results {
            summary.record(result.outcome);
        }

        Self { results, summary }
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        self.summary
    }

    /// Results whose certificate CN is not pinned
    pub fn mismatches(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_security_finding())
    }

    pub fn has_mismatch(&self) -> bool {
        !self.summary.is_clean()
    }

    /// Hostnames in `tier` that served a pinned certificate, in report order
    pub fn pinned_hosts(&self, tier: Tier) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.target.tier == tier && r.outcome == ProbeOutcome::PinnedOk)
            .map(ProbeResult::hostname)
            .collect()
    }
}
