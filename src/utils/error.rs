//! Custom error types for broker-probe
//!
//! Per-target network failures never surface as errors: the probe maps them
//! onto a [`ProbeOutcome`](crate::models::ProbeOutcome). The types here cover
//! the internals of a single probe step and the fatal conditions that abort a
//! whole run (bad configuration, unwritable extension directory).

use std::net::SocketAddr;
use thiserror::Error;

/// Top-level error type for the broker-probe application
#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("DNS resolution error: {0}")]
    Dns(#[from] DnsError),

    #[error("TCP connection error: {0}")]
    Tcp(#[from] TcpError),

    #[error("SSL/TLS error: {0}")]
    Ssl(#[from] SslError),

    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extension build error: {0}")]
    Extension(#[from] ExtensionError),
}

/// DNS resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("No DNS records found for domain: {domain}")]
    NoRecords { domain: String },

    #[error("Invalid domain name: {domain}")]
    InvalidDomain { domain: String },

    #[error("DNS resolution failed for {domain}: {message}")]
    ResolutionFailed { domain: String, message: String },

    #[error("Failed to create resolver {provider}: {message}")]
    ResolverSetup { provider: String, message: String },
}

/// TCP connection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TcpError {
    #[error("Connection refused to {addr}")]
    ConnectionRefused { addr: SocketAddr },

    #[error("Connection reset by {addr}")]
    ConnectionReset { addr: SocketAddr },

    #[error("Host unreachable: {addr}")]
    HostUnreachable { addr: SocketAddr },

    #[error("Network unreachable")]
    NetworkUnreachable,

    #[error("TCP connection failed to {addr}: {message}")]
    ConnectionFailed { addr: SocketAddr, message: String },

    #[error("No addresses to connect to")]
    NoAddresses,
}

/// SSL/TLS protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SslError {
    #[error("SSL handshake failed: {message}")]
    HandshakeFailed { message: String },

    #[error("Server presented no certificate")]
    NoPeerCertificate,

    #[error("Invalid server name: {name}")]
    InvalidServerName { name: String },
}

/// Post-handshake HTTP request errors
///
/// These never change a probe's outcome; the HTTP fields are left empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {message}")]
    ClientSetup { message: String },

    #[error("HTTP request timed out")]
    Timeout,

    #[error("HTTP request failed: {message}")]
    RequestFailed { message: String },
}

/// Certificate parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("Failed to parse certificate: {message}")]
    ParseError { message: String },

    #[error("Empty certificate chain")]
    EmptyChain,
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },
}

/// Browser extension asset errors
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Refusing to build: certificate mismatch on {hosts}")]
    MismatchDetected { hosts: String },

    #[error("Refusing to build: no known host passed certificate pinning")]
    NoVerifiedHosts,

    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("Failed to encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Failed to write extension archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ExtensionError {
    /// The report rules out an extension; nothing was written.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            ExtensionError::MismatchDetected { .. } | ExtensionError::NoVerifiedHosts
        )
    }
}

/// Result type alias using ToolkitError
pub type Result<T> = std::result::Result<T, ToolkitError>;
