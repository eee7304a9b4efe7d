//! Data models for broker-probe
//!
//! This module contains all the data structures used throughout the application.

pub mod pin_set;
pub mod probe_result;
pub mod report;
pub mod target;

pub use pin_set::PinSet;
pub use probe_result::{ProbeOutcome, ProbeResult};
pub use report::{Report, ReportSummary};
pub use target::{Target, Tier};
