//! Allow-list of certificate common names

use serde::Serialize;
use std::collections::BTreeSet;

/// Common names the brokerage's certificates are expected to carry
pub const DEFAULT_PINNED_CNS: &[&str] = &["ibkr.eu", "interactivebrokers.com"];

/// Immutable set of allow-listed certificate common names.
///
/// Built once at start-up and shared behind an `Arc` by every probe.
/// Membership is an exact, case-sensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PinSet {
    names: BTreeSet<String>,
}

impl PinSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `common_name` is allow-listed
    pub fn contains(&self, common_name: &str) -> bool {
        self.names.contains(common_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Pinned names in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for PinSet {
    fn default() -> Self {
        Self::new(DEFAULT_PINNED_CNS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pins() {
        let pins = PinSet::default();
        assert_eq!(pins.len(), 2);
        assert!(pins.contains("ibkr.eu"));
        assert!(pins.contains("interactivebrokers.com"));
    }

    #[test]
    fn test_membership_is_exact() {
        let pins = PinSet::new(["IBKR LLC"]);
        assert!(pins.contains("IBKR LLC"));
        assert!(!pins.contains("ibkr llc"));
        assert!(!pins.contains("IBKR LLC "));
        assert!(!pins.contains("IBKR"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let pins = PinSet::new(vec!["a".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(pins.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
