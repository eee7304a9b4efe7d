//! Utility modules for broker-probe
//!
//! This module contains error types, progress indicators, and other utilities.

pub mod error;
pub mod progress;

pub use error::{
    CertificateError, ConfigError, DnsError, ExtensionError, HttpError, Result, SslError,
    TcpError, ToolkitError,
};
pub use progress::ProbeProgress;
