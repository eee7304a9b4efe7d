//! Probe orchestration engine
//!
//! Fans targets out over a bounded pool of tokio workers and assembles the
//! report once every target has a result. The engine is frontend-agnostic;
//! the CLI drives a progress bar from [`PoolEvent`]s.

use crate::checks::{DnsChecker, HttpChecker, Probe, TlsProbe};
use crate::checks::probe::timed_out;
use crate::config::Settings;
use crate::models::{PinSet, ProbeOutcome, ProbeResult, Report, Target};
use crate::utils::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;

/// Events emitted while the pool runs
#[derive(Debug, Clone)]
pub enum PoolEvent {
    Started { hostname: String },
    Finished(ProbeResult),
}

/// Callback receiving pool events from any worker
pub type EventSink = Arc<dyn Fn(PoolEvent) + Send + Sync>;

/// An event sink that drops everything
pub fn ignore_events() -> EventSink {
    Arc::new(|_| {})
}

/// Build the production probe described by `settings`
pub fn build_probe(settings: &Settings) -> Result<Arc<dyn Probe>> {
    let resolver = DnsChecker::new(&settings.resolver)?;
    tracing::debug!(
        resolver = resolver.provider(),
        port = settings.probe.port,
        http_check = settings.probe.http_check,
        "building probe"
    );

    let mut probe = TlsProbe::new(Arc::new(resolver), settings.probe.port)?;
    if settings.probe.http_check {
        probe = probe.with_http(HttpChecker::new());
    }
    Ok(Arc::new(probe))
}

/// Validate settings, generate targets, probe them all and aggregate.
///
/// Invalid settings abort before any connection is attempted.
pub async fn run(settings: &Settings, probe: Arc<dyn Probe>, on_event: EventSink) -> Result<Report> {
    settings.validate()?;

    let targets = settings.targets.generate(settings.probe.include_extended);
    let pins = Arc::new(settings.pin_set());
    tracing::info!(
        targets = targets.len(),
        workers = settings.probe.workers,
        timeout_secs = settings.probe.timeout_secs,
        pins = pins.len(),
        "starting probe run"
    );

    let results = run_all(
        targets,
        settings.probe.workers,
        settings.probe.timeout(),
        pins,
        probe,
        on_event,
    )
    .await;

    let report = Report::aggregate(results);
    let summary = report.summary();
    tracing::info!(
        total = summary.total,
        pinned_ok = summary.pinned_ok,
        cn_mismatch = summary.cn_mismatch,
        unreachable = summary.unreachable(),
        "probe run complete"
    );
    Ok(report)
}

/// Probe every target with at most `worker_count` probes in flight.
///
/// Returns exactly one result per target, in the order the targets were
/// given regardless of which probe finished first. Targets beyond
/// the pool size wait in a bounded queue until a worker frees up. Each probe
/// is cut off at `timeout` (reported as `Timeout`) and a panicking probe is
/// reported as `TlsError`, so one bad target never stalls or aborts the batch.
pub async fn run_all(
    targets: Vec<Target>,
    worker_count: usize,
    timeout: Duration,
    pins: Arc<PinSet>,
    probe: Arc<dyn Probe>,
    on_event: EventSink,
) -> Vec<ProbeResult> {
    let total = targets.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = worker_count.clamp(1, total);

    let (tx, rx) = mpsc::channel::<(usize, Target)>(workers);
    let rx = Arc::new(Mutex::new(rx));

    let producer = {
        let targets = targets.clone();
        tokio::spawn(async move {
            for item in targets.into_iter().enumerate() {
                if tx.send(item).await.is_err() {
                    break;
                }
            }
        })
    };

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let rx = Arc::clone(&rx);
        let pins = Arc::clone(&pins);
        let probe = Arc::clone(&probe);
        let on_event = Arc::clone(&on_event);

        handles.push(tokio::spawn(async move {
            let mut local = Vec::new();
            loop {
                let next = rx.lock().await.recv().await;
                let Some((index, target)) = next else {
                    break;
                };

                on_event(PoolEvent::Started {
                    hostname: target.hostname.clone(),
                });
                let result = run_one(probe.as_ref(), &target, timeout, &pins).await;
                on_event(PoolEvent::Finished(result.clone()));
                local.push((index, result));
            }
            tracing::trace!(worker, probed = local.len(), "worker drained queue");
            local
        }));
    }

    let mut slots: Vec<Option<ProbeResult>> = vec![None; total];
    for handle in handles {
        match handle.await {
            Ok(local) => {
                for (index, result) in local {
                    slots[index] = Some(result);
                }
            }
            Err(e) => tracing::warn!("probe worker failed: {}", e),
        }
    }
    if let Err(e) = producer.await {
        tracing::warn!("target producer failed: {}", e);
    }

    // A worker that died took its finished results with it.
    slots
        .into_iter()
        .zip(targets)
        .map(|(slot, target)| {
            slot.unwrap_or_else(|| {
                ProbeResult::failure(target, ProbeOutcome::TlsError, "probe worker failed", Duration::ZERO)
            })
        })
        .collect()
}

async fn run_one(probe: &dyn Probe, target: &Target, timeout: Duration, pins: &PinSet) -> ProbeResult {
    let start = Instant::now();
    let guarded = AssertUnwindSafe(probe.probe(target, timeout, pins)).catch_unwind();

    match tokio::time::timeout(timeout, guarded).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => {
            tracing::warn!(hostname = %target.hostname, "probe panicked");
            ProbeResult::failure(
                target.clone(),
                ProbeOutcome::TlsError,
                "probe panicked",
                start.elapsed(),
            )
        }
        Err(_) => timed_out(target, timeout, start.elapsed()),
    }
}
