//! Configuration module for broker-probe
//!
//! Handles loading and validating configuration from TOML files.

pub mod settings;

pub use settings::{DnsProvider, PinSettings, ProbeSettings, Settings};

use crate::utils::ConfigError;
use std::path::Path;

/// Load settings from `path`, or from the default location when `None`
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => Settings::load_from_file(path),
        None => Settings::load_default(),
    }
}
