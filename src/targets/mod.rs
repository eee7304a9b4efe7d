//! Target generation
//!
//! Expands a base name and two TLD lists into the ordered candidate
//! hostnames: every KNOWN host first, then (optionally) every EXTENDED host.
//! Each tier is emitted in canonical (lexicographic TLD) order so that two
//! runs with the same catalog probe the same sequence.

use crate::models::{Target, Tier};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};

/// Brand label the regional hostnames are built from
pub const DEFAULT_BASE_NAME: &str = "interactivebrokers";

/// Jurisdictions the brokerage is expected to operate
pub const KNOWN_TLDS: &[&str] = &[
    "ch", "co.uk", "com", "de", "ee", "es", "eu", "fr", "ie", "it", "lu",
];

/// Additional European ccTLDs probed on request
pub const EXTENDED_TLDS: &[&str] = &[
    "ad", "al", "am", "at", "az", "ba", "bg", "by", "cy", "cz", "dk", "fo", "ge", "gi", "gr",
    "hr", "hu", "il", "im", "is", "je", "li", "lt", "lv", "mc", "md", "me", "mk", "mt", "nl",
    "no", "pl", "pt", "ro", "rs", "se", "si", "sk", "tr", "ua", "va",
];

/// Base name plus the TLDs of each tier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetCatalog {
    pub base_name: String,
    pub known_tlds: Vec<String>,
    pub extended_tlds: Vec<String>,
}

impl Default for TargetCatalog {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_BASE_NAME.to_string(),
            known_tlds: KNOWN_TLDS.iter().map(|s| s.to_string()).collect(),
            extended_tlds: EXTENDED_TLDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TargetCatalog {
    /// Produce the ordered target list
    ///
    /// TLDs are normalised (trimmed, lowercased, leading dot removed), empty
    /// entries are dropped and duplicates collapse. An EXTENDED TLD that is
    /// also KNOWN is emitted once, as KNOWN.
    pub fn generate(&self, include_extended: bool) -> Vec<Target> {
        let known = canonical_tlds(&self.known_tlds);
        let mut seen: HashSet<String> = HashSet::new();
        let mut targets = Vec::with_capacity(known.len() + self.extended_tlds.len());

        for tld in &known {
            let hostname = self.hostname(tld);
            if seen.insert(hostname.clone()) {
                targets.push(Target::new(hostname, Tier::Known));
            }
        }

        if include_extended {
            for tld in canonical_tlds(&self.extended_tlds) {
                let hostname = self.hostname(&tld);
                if seen.insert(hostname.clone()) {
                    targets.push(Target::new(hostname, Tier::Extended));
                }
            }
        }

        tracing::debug!(
            count = targets.len(),
            include_extended,
            "generated probe targets"
        );
        targets
    }

    fn hostname(&self, tld: &str) -> String {
        format!("{}.{}", self.base_name.trim().trim_end_matches('.'), tld)
    }
}

/// Generate targets from the built-in catalog
pub fn generate(include_extended: bool) -> Vec<Target> {
    TargetCatalog::default().generate(include_extended)
}

fn canonical_tlds(tlds: &[String]) -> BTreeSet<String> {
    tlds.iter()
        .map(|t| t.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_only() {
        let targets = generate(false);
        assert_eq!(targets.len(), KNOWN_TLDS.len());
        assert!(targets.iter().all(|t| t.tier == Tier::Known));
        assert_eq!(targets[0].hostname, "interactivebrokers.ch");
        assert_eq!(targets[1].hostname, "interactivebrokers.co.uk");
        assert_eq!(targets[2].hostname, "interactivebrokers.com");
    }

    #[test]
    fn test_extended_follow_known() {
        let targets = generate(true);
        assert_eq!(targets.len(), KNOWN_TLDS.len() + EXTENDED_TLDS.len());
        let first_extended = targets
            .iter()
            .position(|t| t.tier == Tier::Extended)
            .unwrap();
        assert_eq!(first_extended, KNOWN_TLDS.len());
        assert!(targets[first_extended..]
            .iter()
            .all(|t| t.tier == Tier::Extended));
        assert_eq!(targets[first_extended].hostname, "interactivebrokers.ad");
        assert_eq!(targets.last().unwrap().hostname, "interactivebrokers.va");
    }

    #[test]
    fn test_builtin_lists_are_canonical() {
        let mut known = KNOWN_TLDS.to_vec();
        known.sort_unstable();
        assert_eq!(known, KNOWN_TLDS);
        let mut extended = EXTENDED_TLDS.to_vec();
        extended.sort_unstable();
        assert_eq!(extended, EXTENDED_TLDS);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(generate(true), generate(true));
    }

    #[test]
    fn test_custom_catalog_normalises_and_dedups() {
        let catalog = TargetCatalog {
            base_name: "ibkr".to_string(),
            known_tlds: vec!["EU".into(), "com".into(), ".com".into(), " ".into()],
            extended_tlds: vec!["nl".into(), "eu".into(), "at".into()],
        };
        let hosts: Vec<(String, Tier)> = catalog
            .generate(true)
            .into_iter()
            .map(|t| (t.hostname, t.tier))
            .collect();
        assert_eq!(
            hosts,
            vec![
                ("ibkr.com".to_string(), Tier::Known),
                ("ibkr.eu".to_string(), Tier::Known),
                ("ibkr.at".to_string(), Tier::Extended),
                ("ibkr.nl".to_string(), Tier::Extended),
            ]
        );
    }
}
