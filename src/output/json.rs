//! JSON output formatter

use crate::models::{PinSet, Report};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON-serializable output structure
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub generated_at: DateTime<Utc>,
    pub pins: &'a PinSet,
    pub clean: bool,
    pub report: &'a Report,
}

impl<'a> JsonOutput<'a> {
    pub fn new(report: &'a Report, pins: &'a PinSet) -> Self {
        Self {
            generated_at: Utc::now(),
            pins,
            clean: report.summary().is_clean(),
            report,
        }
    }
}

/// Render the report as pretty JSON
pub fn to_json(report: &Report, pins: &PinSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput::new(report, pins))
}

/// Print the report as JSON to stdout
pub fn print_json(report: &Report, pins: &PinSet) -> anyhow::Result<()> {
    println!("{}", to_json(report, pins)?);
    Ok(())
}
