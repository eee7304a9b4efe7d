//! Application settings configuration
//!
//! Defines probe limits, the target catalog, the pin list and the DNS
//! provider. Every section has defaults so a config file only needs the keys
//! it changes.

use crate::models::pin_set::DEFAULT_PINNED_CNS;
use crate::models::PinSet;
use crate::targets::TargetCatalog;
use crate::utils::ConfigError;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

/// DNS provider configuration
///
/// An empty server list means the system resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsProvider {
    pub name: String,
    #[serde(default)]
    pub servers: Vec<IpAddr>,
    #[serde(default)]
    pub description: String,
}

impl Default for DnsProvider {
    fn default() -> Self {
        Self {
            name: "System".to_string(),
            servers: vec![],
            description: "System default DNS resolver".to_string(),
        }
    }
}

/// Probe and worker pool settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Budget for resolution, connect and handshake of one host
    pub timeout_secs: f64,
    pub workers: usize,
    pub port: u16,
    pub include_extended: bool,
    /// Follow redirects from `/` after a successful handshake
    pub http_check: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 5.0,
            workers: 10,
            port: 443,
            include_extended: false,
            http_check: true,
        }
    }
}

impl ProbeSettings {
    /// Per-probe timeout
    ///
    /// Only meaningful after [`Settings::validate`] has accepted the value.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(Duration::ZERO)
    }
}

/// Certificate pinning settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PinSettings {
    pub common_names: Vec<String>,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            common_names: DEFAULT_PINNED_CNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub probe: ProbeSettings,
    #[serde(default)]
    pub targets: TargetCatalog,
    #[serde(default)]
    pub pins: PinSettings,
    #[serde(default)]
    pub resolver: DnsProvider,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// Called before any probing starts; a failure here aborts the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout = self.probe.timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "probe.timeout_secs".to_string(),
                message: format!("must be a positive number of seconds, got {}", timeout),
            });
        }
        match Duration::try_from_secs_f64(timeout) {
            Ok(duration) if !duration.is_zero() => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "probe.timeout_secs".to_string(),
                    message: format!("{} seconds is out of range", timeout),
                })
            }
        }
        if self.probe.workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "probe.workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.probe.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "probe.port".to_string(),
                message: "must be between 1 and 65535".to_string(),
            });
        }
        if self.targets.base_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "targets.base_name".to_string(),
            });
        }
        if self.pins.common_names.iter().all(|cn| cn.is_empty()) {
            return Err(ConfigError::MissingRequired {
                key: "pins.common_names".to_string(),
            });
        }
        Ok(())
    }

    /// Build the immutable pin set shared by every probe
    pub fn pin_set(&self) -> PinSet {
        PinSet::new(self.pins.common_names.iter().filter(|cn| !cn.is_empty()).cloned())
    }
}
