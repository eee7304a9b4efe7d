//! Table rendering using comfy-table

use crate::models::{ProbeOutcome, ProbeResult, Report};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, ContentArrangement, Table};

const HEADERS: [&str; 7] = [
    "Tier",
    "Host",
    "Certificate CN",
    "Result",
    "Reason",
    "Landing",
    "Time",
];

/// Text cells of one report row
pub fn report_row(result: &ProbeResult) -> Vec<String> {
    vec![
        result.target.tier.to_string(),
        result.target.hostname.clone(),
        result
            .observed_cn
            .clone()
            .unwrap_or_else(|| "NO_CERT".to_string()),
        format!("{} {}", result.outcome.icon(), result.outcome),
        result.detail.clone().unwrap_or_default(),
        landing(result),
        format!("{}ms", result.elapsed.as_millis()),
    ]
}

/// HTTP status and final URL, `-` when no page was fetched
fn landing(result: &ProbeResult) -> String {
    match (result.http_status, result.final_url.as_deref()) {
        (Some(status), Some(url)) => format!("{} {}", status, url),
        (Some(status), None) => status.to_string(),
        _ => "-".to_string(),
    }
}

fn outcome_cell(result: &ProbeResult, text: String) -> Cell {
    let cell = Cell::new(text);
    match result.outcome {
        ProbeOutcome::PinnedOk => cell.fg(Color::Green),
        ProbeOutcome::CnMismatch => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        ProbeOutcome::DnsError | ProbeOutcome::Timeout | ProbeOutcome::TlsError => {
            cell.fg(Color::Yellow)
        }
    }
}

/// Build the report table, constrained to `width` columns when given
pub fn build_report_table(report: &Report, width: Option<u16>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    if let Some(width) = width {
        table.set_width(width);
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = HEADERS
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for result in report.iter() {
        let cells: Vec<Cell> = report_row(result)
            .into_iter()
            .enumerate()
            .map(|(column, text)| match column {
                // CN and Result columns carry the verdict colour
                2 | 3 => outcome_cell(result, text),
                _ if result.outcome.is_security_finding() => {
                    Cell::new(text).add_attribute(Attribute::Bold)
                }
                _ => Cell::new(text),
            })
            .collect();
        table.add_row(cells);
    }

    table
}

/// Format the report table to a string, indented like the rest of the output
pub fn format_report_table(report: &Report) -> String {
    // Constrain table width to terminal width minus indent, default to 120 if detection fails
    let width = crossterm::terminal::size()
        .map(|(cols, _)| cols)
        .unwrap_or(120)
        .saturating_sub(4);
    let table = build_report_table(report, Some(width));

    let mut out = String::new();
    for line in table.to_string().lines() {
        out.push_str(&format!("    {}\n", line));
    }
    out
}

/// Print the report table
pub fn print_report_table(report: &Report) {
    print!("{}", format_report_table(report));
}
