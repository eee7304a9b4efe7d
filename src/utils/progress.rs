//! Progress indicators for CLI mode
//!
//! This module provides progress display using indicatif and console.

use crate::models::ProbeOutcome;
use crate::runner::PoolEvent;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar driven by worker pool events
#[derive(Clone)]
pub struct ProbeProgress {
    bar: ProgressBar,
}

impl ProbeProgress {
    /// Create a progress bar for `total` probes
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A progress tracker that draws nothing (quiet and JSON modes)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update the bar from a pool event
    pub fn on_event(&self, event: &PoolEvent) {
        match event {
            PoolEvent::Started { hostname } => {
                self.bar.set_message(format!("probing {}", hostname));
            }
            PoolEvent::Finished(result) => {
                if result.outcome == ProbeOutcome::CnMismatch {
                    self.bar.println(format!(
                        "  {} {} presented {}",
                        style("✗✗").red().bold(),
                        style(&result.target.hostname).bold(),
                        result.observed_cn.as_deref().unwrap_or("no CN"),
                    ));
                }
                self.bar.inc(1);
            }
        }
    }

    /// Finish and clear the progress bar
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Print a pass status
pub fn print_pass(message: &str) {
    println!("  {} {}", style("✓").green(), message);
}

/// Print a warning status to stderr
pub fn print_warning(message: &str) {
    eprintln!("  {} {}", style("⚠").yellow(), message);
}
