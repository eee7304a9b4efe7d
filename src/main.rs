//! broker-probe - TLS certificate pinning probe for regional brokerage hostnames
//!
//! Probes every generated hostname, prints a sorted report and exits with:
//! - 0 when no host served a certificate outside the pin list
//! - 2 when at least one host did (CN_MISMATCH)
//! - 1 on configuration, setup or extension write errors

use anyhow::Context;
use broker_probe::cli::{exit_code, Cli, OutputFormat, EXIT_FATAL};
use broker_probe::config;
use broker_probe::extension::{self, ExtensionStatus};
use broker_probe::output;
use broker_probe::runner::{self, EventSink};
use broker_probe::utils::progress::{print_pass, print_warning};
use broker_probe::utils::ProbeProgress;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Install the ring crypto provider for rustls
    let _ = rustls::crypto::ring::default_provider().install_default();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Returns the exit status for the finished run
async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut settings =
        config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut settings);
    settings.validate()?;

    let pins = settings.pin_set();
    let total = settings
        .targets
        .generate(settings.probe.include_extended)
        .len();

    let progress = if cli.show_progress() {
        ProbeProgress::new(total as u64)
    } else {
        ProbeProgress::hidden()
    };
    let on_event: EventSink = {
        let progress = progress.clone();
        Arc::new(move |event| progress.on_event(&event))
    };

    let probe = runner::build_probe(&settings)?;
    let report = runner::run(&settings, probe, on_event).await?;
    progress.finish_and_clear();

    match cli.format {
        OutputFormat::Table => {
            output::print_header("Certificate Pinning Report");
            output::print_pins(&pins);
            println!();
            output::print_report_table(&report);
            output::print_summary(&report.summary());
        }
        OutputFormat::Json => output::print_json(&report, &pins)?,
        OutputFormat::Plain => output::print_plain(&report),
    }

    if cli.build_extension {
        match extension::build(&report, &cli.extension_dir, &cli.zip_output)? {
            ExtensionStatus::Built { .. } if cli.format == OutputFormat::Json => {}
            ExtensionStatus::Built { archive, .. } => print_pass(&format!(
                "extension written to {}, archive at {}",
                cli.extension_dir.display(),
                archive.display()
            )),
            ExtensionStatus::Refused(reason) => {
                print_warning(&format!("extension not built: {}", reason))
            }
        }
    }

    Ok(exit_code(&report))
}
