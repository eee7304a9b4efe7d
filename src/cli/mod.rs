//! Command-line interface module
//!
//! This module handles CLI argument parsing using Clap.

pub mod args;

pub use args::{exit_code, Cli, OutputFormat, EXIT_CLEAN, EXIT_FATAL, EXIT_MISMATCH};
