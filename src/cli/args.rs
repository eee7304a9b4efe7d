//! CLI argument definitions using clap

use crate::config::Settings;
use crate::models::Report;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "broker-probe")]
#[command(version)]
#[command(
    about = "Probe regional brokerage hostnames over TLS and check the certificate CN against a pin list",
    long_about = None
)]
pub struct Cli {
    /// Per-host timeout in seconds for resolution, connect and handshake
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Number of probes in flight at once
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Also probe the extended TLD list
    #[arg(long, alias = "includeExtended")]
    pub include_extended: bool,

    /// TLS port to probe
    #[arg(long)]
    pub port: Option<u16>,

    /// Skip following redirects from `/` after the handshake
    #[arg(long)]
    pub no_http: bool,

    /// Allow-listed certificate CN (repeatable, replaces the configured list)
    #[arg(long = "pin", value_name = "CN")]
    pub pins: Vec<String>,

    /// Configuration file (default: config/default.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// No progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Write the browser extension assets after probing
    #[arg(long, alias = "buildExtension")]
    pub build_extension: bool,

    /// Directory for the browser extension assets
    #[arg(long, alias = "extensionDir", default_value = "dist/extension")]
    pub extension_dir: PathBuf,

    /// ZIP archive of the browser extension
    #[arg(long, alias = "zipOutput", default_value = "dist/brokersitehelper.zip")]
    pub zip_output: PathBuf,
}

impl Cli {
    /// Overlay command-line values on loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(timeout) = self.timeout {
            settings.probe.timeout_secs = timeout;
        }
        if let Some(workers) = self.workers {
            settings.probe.workers = workers;
        }
        if let Some(port) = self.port {
            settings.probe.port = port;
        }
        if self.include_extended {
            settings.probe.include_extended = true;
        }
        if self.no_http {
            settings.probe.http_check = false;
        }
        if !self.pins.is_empty() {
            settings.pins.common_names = self.pins.clone();
        }
    }

    /// Whether to draw the progress bar
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format != OutputFormat::Json
    }
}

/// No host served a certificate outside the pin list
pub const EXIT_CLEAN: u8 = 0;
/// Configuration, setup or output failure
pub const EXIT_FATAL: u8 = 1;
/// At least one host served a certificate outside the pin list
pub const EXIT_MISMATCH: u8 = 2;

/// Process exit status for a completed run
pub fn exit_code(report: &Report) -> u8 {
    if report.has_mismatch() {
        EXIT_MISMATCH
    } else {
        EXIT_CLEAN
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Rich terminal tables (default)
    Table,
    /// JSON output
    Json,
    /// One line per host
    Plain,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Plain => write!(f, "plain"),
        }
    }
}
