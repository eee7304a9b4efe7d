//! Rich terminal output formatting

use crate::models::{PinSet, ProbeOutcome, ProbeResult, Report, ReportSummary};
use console::style;

/// Print section header
pub fn print_header(title: &str) {
    println!();
    println!("{}", style(format!("━━━ {} ━━━", title)).cyan().bold());
    println!();
}

/// One line per host, in report order
pub fn plain_line(result: &ProbeResult) -> String {
    format!(
        "{:<8} {:<28} {:<24} {:<11} {}",
        result.target.tier.as_str(),
        result.target.hostname,
        result.observed_cn.as_deref().unwrap_or("NO_CERT"),
        result.outcome.as_str(),
        result.detail.as_deref().unwrap_or(""),
    )
}

/// Print the report without colours or table borders
pub fn print_plain(report: &Report) {
    for result in report.iter() {
        println!("{}", plain_line(result));
    }
}

/// Print the pin list the run was judged against
pub fn print_pins(pins: &PinSet) {
    let names: Vec<&str> = pins.iter().collect();
    println!("  {} {}", style("Pinned CNs:").dim(), names.join(", "));
}

/// Print outcome counts and the overall verdict
pub fn print_summary(summary: &ReportSummary) {
    print_header("Summary");

    let counts = [
        (ProbeOutcome::PinnedOk, summary.pinned_ok),
        (ProbeOutcome::DnsError, summary.dns_error),
        (ProbeOutcome::Timeout, summary.timeout),
        (ProbeOutcome::TlsError, summary.tls_error),
        (ProbeOutcome::CnMismatch, summary.cn_mismatch),
    ];
    for (outcome, count) in counts {
        let label = format!("{:<12}", outcome.as_str());
        let line = format!("{} {}", label, count);
        match outcome {
            ProbeOutcome::PinnedOk => println!("  {} {}", style(outcome.icon()).green(), line),
            ProbeOutcome::CnMismatch if count > 0 => {
                println!("  {} {}", style(outcome.icon()).red().bold(), style(line).red().bold())
            }
            _ => println!("  {} {}", style(outcome.icon()).yellow(), line),
        }
    }

    println!();
    if summary.is_clean() {
        println!(
            "  {} {} hosts probed, no certificate mismatches",
            style("✓").green().bold(),
            summary.total
        );
    } else {
        println!(
            "  {} {} of {} hosts served a certificate outside the pin list",
            style("✗").red().bold(),
            summary.cn_mismatch,
            summary.total
        );
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}
