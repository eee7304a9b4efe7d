use async_trait::async_trait;
use broker_probe::checks::Probe;
use broker_probe::models::{PinSet, ProbeOutcome, ProbeResult, Report, Target};
use broker_probe::runner::{self, EventSink, PoolEvent};
use broker_probe::targets;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Sleeps for `delay` and reports the CN `ibkr.eu` for every host
struct SleepyProbe {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SleepyProbe {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Probe for SleepyProbe {
    async fn probe(&self, target: &Target, _timeout: Duration, pins: &PinSet) -> ProbeResult {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ProbeResult::from_handshake(target.clone(), Some("ibkr.eu".to_string()), pins, self.delay)
    }
}

/// Hangs on one host, panics on another, answers the rest immediately
struct UnrulyProbe;

#[async_trait]
impl Probe for UnrulyProbe {
    async fn probe(&self, target: &Target, _timeout: Duration, pins: &PinSet) -> ProbeResult {
        if target.hostname.ends_with(".de") {
            std::future::pending::<()>().await;
        }
        if target.hostname.ends_with(".fr") {
            panic!("probe blew up");
        }
        let cn = if target.hostname.ends_with(".es") {
            "Parked Domain Inc"
        } else {
            "interactivebrokers.com"
        };
        ProbeResult::from_handshake(
            target.clone(),
            Some(cn.to_string()),
            pins,
            Duration::from_millis(7),
        )
    }
}

fn pins() -> Arc<PinSet> {
    Arc::new(PinSet::default())
}

#[tokio::test(start_paused = true)]
async fn test_one_result_per_target_for_any_pool_size() {
    let targets = targets::generate(true);
    for workers in [1, 3, 10, 64, 500] {
        let results = runner::run_all(
            targets.clone(),
            workers,
            Duration::from_secs(5),
            pins(),
            Arc::new(SleepyProbe::new(Duration::from_millis(10))),
            runner::ignore_events(),
        )
        .await;

        assert_eq!(results.len(), targets.len(), "workers = {}", workers);
        let probed: HashSet<&str> = results.iter().map(|r| r.hostname()).collect();
        let expected: HashSet<&str> = targets.iter().map(|t| t.hostname.as_str()).collect();
        assert_eq!(probed, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_probes_bounded_by_worker_count() {
    let probe = Arc::new(SleepyProbe::new(Duration::from_millis(50)));
    let results = runner::run_all(
        targets::generate(true),
        4,
        Duration::from_secs(5),
        pins(),
        probe.clone(),
        runner::ignore_events(),
    )
    .await;

    assert_eq!(results.len(), 52);
    let max = probe.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 4, "saw {} probes in flight", max);
    assert!(max > 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_worker_runs_serially() {
    let targets: Vec<Target> = targets::generate(false).into_iter().take(5).collect();
    let start = Instant::now();
    let results = runner::run_all(
        targets,
        1,
        Duration::from_secs(5),
        pins(),
        Arc::new(SleepyProbe::new(Duration::from_secs(1))),
        runner::ignore_events(),
    )
    .await;

    assert_eq!(results.len(), 5);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_parallel_workers_overlap() {
    let targets: Vec<Target> = targets::generate(false).into_iter().take(5).collect();
    let start = Instant::now();
    runner::run_all(
        targets,
        5,
        Duration::from_secs(5),
        pins(),
        Arc::new(SleepyProbe::new(Duration::from_secs(1))),
        runner::ignore_events(),
    )
    .await;

    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_hanging_and_panicking_probes_do_not_stall_batch() {
    let timeout = Duration::from_secs(2);
    let start = Instant::now();
    let results = runner::run_all(
        targets::generate(false),
        3,
        timeout,
        pins(),
        Arc::new(UnrulyProbe),
        runner::ignore_events(),
    )
    .await;

    assert_eq!(results.len(), 11);
    assert!(start.elapsed() < timeout * 2);

    let by_host = |suffix: &str| {
        results
            .iter()
            .find(|r| r.hostname().ends_with(suffix))
            .unwrap()
    };
    let hung = by_host(".de");
    assert_eq!(hung.outcome, ProbeOutcome::Timeout);
    assert!(hung.elapsed >= timeout);
    assert!(hung.observed_cn.is_none());

    let panicked = by_host(".fr");
    assert_eq!(panicked.outcome, ProbeOutcome::TlsError);
    assert_eq!(panicked.detail.as_deref(), Some("probe panicked"));

    assert_eq!(by_host(".es").outcome, ProbeOutcome::CnMismatch);
    assert_eq!(by_host(".com").outcome, ProbeOutcome::PinnedOk);
}

#[tokio::test(start_paused = true)]
async fn test_events_cover_every_target() {
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let on_event: EventSink = {
        let started = started.clone();
        let finished = finished.clone();
        Arc::new(move |event| match event {
            PoolEvent::Started { .. } => {
                started.fetch_add(1, Ordering::SeqCst);
            }
            PoolEvent::Finished(_) => {
                finished.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    runner::run_all(
        targets::generate(false),
        4,
        Duration::from_secs(1),
        pins(),
        Arc::new(UnrulyProbe),
        on_event,
    )
    .await;

    assert_eq!(started.load(Ordering::SeqCst), 11);
    assert_eq!(finished.load(Ordering::SeqCst), 11);
}

#[tokio::test]
async fn test_empty_target_list() {
    let results = runner::run_all(
        Vec::new(),
        10,
        Duration::from_secs(1),
        pins(),
        Arc::new(UnrulyProbe),
        runner::ignore_events(),
    )
    .await;
    assert!(results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_report_independent_of_completion_order() {
    let results = runner::run_all(
        targets::generate(true),
        8,
        Duration::from_secs(1),
        pins(),
        Arc::new(UnrulyProbe),
        runner::ignore_events(),
    )
    .await;

    let forward = Report::aggregate(results.clone());
    let mut reversed = results.clone();
    reversed.reverse();
    let mut rotated = results;
    rotated.rotate_left(17);

    let expected = serde_json::to_string(&forward).unwrap();
    assert_eq!(serde_json::to_string(&Report::aggregate(reversed)).unwrap(), expected);
    assert_eq!(serde_json::to_string(&Report::aggregate(rotated)).unwrap(), expected);

    // KNOWN before EXTENDED, then severity
    let first = &forward.results()[0];
    assert_eq!(first.hostname(), "interactivebrokers.ch");
    assert_eq!(first.outcome, ProbeOutcome::PinnedOk);
    assert_eq!(forward.summary().total, 52);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_runs_are_identical() {
    let mut rendered = Vec::new();
    for workers in [2, 9] {
        let results = runner::run_all(
            targets::generate(true),
            workers,
            Duration::from_secs(1),
            pins(),
            Arc::new(SleepyProbe::new(Duration::from_millis(30))),
            runner::ignore_events(),
        )
        .await;
        rendered.push(serde_json::to_string(&Report::aggregate(results)).unwrap());
    }
    assert_eq!(rendered[0], rendered[1]);
}

#[tokio::test(start_paused = true)]
async fn test_results_follow_target_order() {
    let targets = targets::generate(true);
    let results = runner::run_all(
        targets.clone(),
        6,
        Duration::from_secs(1),
        pins(),
        Arc::new(UnrulyProbe),
        runner::ignore_events(),
    )
    .await;

    let probed: Vec<&str> = results.iter().map(|r| r.hostname()).collect();
    let expected: Vec<&str> = targets.iter().map(|t| t.hostname.as_str()).collect();
    assert_eq!(probed, expected);
}
