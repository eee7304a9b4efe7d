use async_trait::async_trait;
use broker_probe::checks::Probe;
use broker_probe::config::Settings;
use broker_probe::models::{PinSet, ProbeOutcome, ProbeResult, Target};
use broker_probe::runner;
use broker_probe::utils::{ConfigError, ToolkitError};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct CountingProbe {
    calls: AtomicUsize,
}

#[async_trait]
impl Probe for CountingProbe {
    async fn probe(&self, target: &Target, _timeout: Duration, _pins: &PinSet) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ProbeResult::failure(target.clone(), ProbeOutcome::DnsError, "no dns", Duration::ZERO)
    }
}

#[tokio::test]
async fn test_zero_workers_rejected_before_probing() {
    let mut settings = Settings::default();
    settings.probe.workers = 0;
    let probe = Arc::new(CountingProbe::default());

    let err = runner::run(&settings, probe.clone(), runner::ignore_events())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ToolkitError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "probe.workers"
    ));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_positive_timeout_rejected() {
    for timeout in [0.0, -1.0, f64::NAN, 1e-12] {
        let mut settings = Settings::default();
        settings.probe.timeout_secs = timeout;
        let probe = Arc::new(CountingProbe::default());
        assert!(runner::run(&settings, probe.clone(), runner::ignore_events())
            .await
            .is_err());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_run_probes_every_generated_target() {
    let toml = r#"
[probe]
workers = 4
include_extended = true

[targets]
known_tlds = ["com", "ie"]
extended_tlds = ["nl", "ie"]
"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let settings = Settings::load_from_file(file.path()).unwrap();
    let probe = Arc::new(CountingProbe::default());
    let report = runner::run(&settings, probe.clone(), runner::ignore_events())
        .await
        .unwrap();

    assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
    assert_eq!(report.summary().dns_error, 3);
    let hosts: Vec<&str> = report.iter().map(|r| r.hostname()).collect();
    assert_eq!(
        hosts,
        vec!["interactivebrokers.com", "interactivebrokers.ie", "interactivebrokers.nl"]
    );
}

#[test]
fn test_missing_config_file() {
    let err = Settings::load_from_file("/nonexistent/broker-probe.toml").unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
