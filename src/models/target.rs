//! Probe target types

use serde::{Deserialize, Serialize};

/// Reporting priority of a hostname
///
/// `Known` sorts before `Extended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Primary hostnames the brokerage is expected to serve
    Known,
    /// Speculative regional variants
    Extended,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Known => "KNOWN",
            Tier::Extended => "EXTENDED",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single hostname to probe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub hostname: String,
    pub tier: Tier,
}

impl Target {
    pub fn new(hostname: impl Into<String>, tier: Tier) -> Self {
        Self {
            hostname: hostname.into(),
            tier,
        }
    }

    pub fn known(hostname: impl Into<String>) -> Self {
        Self::new(hostname, Tier::Known)
    }

    pub fn extended(hostname: impl Into<String>) -> Self {
        Self::new(hostname, Tier::Extended)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.hostname, self.tier)
    }
}
