//! Check modules for broker-probe
//!
//! The individual network steps of a probe and the probe unit that chains
//! them.

pub mod certificate;
pub mod dns;
pub mod http;
pub mod probe;
pub mod ssl;
pub mod tcp;

pub use certificate::CertificateChecker;
pub use dns::{DnsChecker, Resolve, StaticResolver};
pub use http::{HttpChecker, Landing};
pub use probe::{Probe, TlsProbe};
pub use ssl::SslChecker;
pub use tcp::TcpChecker;
