//! broker-probe library
//!
//! Probes the regional hostnames of a brokerage over TLS and checks that
//! each one serves a certificate whose common name is on a pin list:
//! - Deterministic target generation (KNOWN tier, optional EXTENDED tier)
//! - DNS resolution, TCP connect and rustls handshake under one time budget
//! - Bounded worker pool that always yields one result per target
//! - Stable report ordering by tier, outcome severity and hostname
//!
//! # Usage
//!
//! ```rust,ignore
//! use broker_probe::config::Settings;
//! use broker_probe::runner;
//!
//! #[tokio::main]
//! async fn main() -> broker_probe::Result<()> {
//!     let settings = Settings::default();
//!     let probe = runner::build_probe(&settings)?;
//!     let report = runner::run(&settings, probe, runner::ignore_events()).await?;
//!     println!("{} mismatches", report.summary().cn_mismatch);
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod extension;
pub mod models;
pub mod output;
pub mod runner;
pub mod targets;
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use config::Settings;
pub use models::{PinSet, ProbeOutcome, ProbeResult, Report, Target, Tier};
pub use utils::{Result, ToolkitError};
