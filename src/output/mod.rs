//! Output formatting module
//!
//! Provides the report renderings:
//! - Rich terminal output with colors and tables
//! - JSON export
//! - Plain one-line-per-host text

pub mod json;
pub mod tables;
pub mod terminal;

pub use json::{print_json, to_json, JsonOutput};
pub use tables::{format_report_table, print_report_table};
pub use terminal::{print_error, print_header, print_pins, print_plain, print_summary};
