//! Batch barrier, circuit breaker and end-to-end scheduling

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{PageScript, RunnerProbe, ScriptedPage};
use kodegen_tools_batchfetch::{
    BatchScheduler, CircuitBreaker, FetchError, Job, NoOpProgress, SchedulerState, SuccessArtifact,
};

mod common;

fn jobs(keys: &[&str]) -> Vec<Job> {
    keys.iter()
        .map(|key| Job::new(*key, format!("https://example.com/{key}")))
        .collect()
}

/// Uneven durations so a missing barrier would let fast workers run ahead
fn staggered(job: &Job) -> Duration {
    let n = job.key.bytes().last().map_or(0, |b| u64::from(b % 3));
    Duration::from_millis(10 + 25 * n)
}

#[tokio::test]
async fn test_next_batch_waits_for_every_job_of_the_previous() {
    let (_dir, cache) = common::temp_cache("run");
    let probe = RunnerProbe::default();
    let width = 3;
    let workers = (0..width).map(|_| probe.runner(&cache, staggered)).collect();
    let keys = ["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7"];

    let mut scheduler = BatchScheduler::new(workers, cache.clone(), Arc::new(NoOpProgress)).unwrap();
    let summary = scheduler.run(&jobs(&keys)).await;

    assert_eq!(summary.state, SchedulerState::Done);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.dispatched, keys.len());
    assert_eq!(probe.run_count(), keys.len());
    assert!(probe.max_in_flight.load(Ordering::SeqCst) <= width);

    let batches: Vec<&[&str]> = keys.chunks(width).collect();
    for pair in batches.windows(2) {
        let previous_end = pair[0]
            .iter()
            .map(|key| probe.span(key).finished)
            .max()
            .unwrap();
        for key in pair[1] {
            assert!(
                probe.span(key).started >= previous_end,
                "{key} started before its previous batch drained"
            );
        }
    }
}

#[tokio::test]
async fn test_breaker_halts_at_threshold_with_single_worker() {
    let script = PageScript::default();
    let (_dir, cache) = common::temp_cache("run");
    let workers = common::scripted_workers(&script, &cache, 1, 0);
    let all = jobs(&["a", "b", "c", "d", "e", "f", "g", "h"]);

    let mut scheduler = BatchScheduler::new(workers, cache.clone(), Arc::new(NoOpProgress))
        .unwrap()
        .with_circuit_breaker(Some(CircuitBreaker::new(5)));
    let summary = scheduler.run(&all).await;

    assert!(summary.is_halted());
    assert_eq!(scheduler.state(), SchedulerState::Halted);
    assert_eq!(summary.dispatched, 5);
    assert_eq!(summary.counters.errors, 5);
    assert_eq!(cache.counters().errors(), 5);
    assert!(matches!(
        summary.halt_reason,
        Some(FetchError::CircuitBreakTripped {
            errors: 5,
            threshold: 5
        })
    ));
    assert!(!cache.error_exists("f"));
    assert_eq!(script.navigations().len(), 5);
}

#[tokio::test]
async fn test_breaker_lets_the_tripping_batch_finish() {
    let (_dir, cache) = common::temp_cache("run");
    let probe = RunnerProbe::default();
    let workers = (0..4).map(|_| probe.runner(&cache, staggered)).collect();
    let all = jobs(&["fail0", "fail1", "fail2", "ok3", "fail4", "fail5", "fail6", "ok7", "ok8"]);

    let mut scheduler = BatchScheduler::new(workers, cache.clone(), Arc::new(NoOpProgress))
        .unwrap()
        .with_circuit_breaker(Some(CircuitBreaker::new(5)));
    let summary = scheduler.run(&all).await;

    // Second batch crosses the threshold mid-flight; all of it still completes
    assert!(summary.is_halted());
    assert_eq!(summary.batches, 2);
    assert_eq!(probe.run_count(), 8);
    assert_eq!(cache.counters().errors(), 6);
    assert!(!cache.exists("ok8"));
}

#[tokio::test]
async fn test_without_breaker_every_job_is_dispatched() {
    let script = PageScript::default();
    let (_dir, cache) = common::temp_cache("run");
    let workers = common::scripted_workers(&script, &cache, 2, 0);
    let all = jobs(&["a", "b", "c", "d", "e", "f", "g"]);

    let mut scheduler = BatchScheduler::new(workers, cache.clone(), Arc::new(NoOpProgress)).unwrap();
    let summary = scheduler.run(&all).await;

    assert_eq!(summary.state, SchedulerState::Done);
    assert_eq!(summary.dispatched, 7);
    assert_eq!(summary.batches, 4);
    assert_eq!(summary.failed, 7);
    assert_eq!(cache.counters().errors(), 7);
}

#[tokio::test]
async fn test_three_jobs_two_workers_end_to_end() {
    let script = PageScript::new([
        (
            "https://example.com/job1",
            ScriptedPage::Content("<pre>{\"ADDRLIST\": [{\"ZIP\": \"10115\"}]}</pre>".into()),
        ),
        (
            "https://example.com/job2",
            ScriptedPage::Content("<html>Are you a robot? captcha</html>".into()),
        ),
        (
            "https://example.com/job3",
            ScriptedPage::Content("fresh content".into()),
        ),
    ]);
    let (dir, cache) = common::temp_cache("run");

    // Pre-cache job3 through a separate store so the run's counters start at zero
    {
        let earlier = kodegen_tools_batchfetch::CacheStore::new(
            dir.path().join("cache"),
            dir.path().join("error_cache"),
            "run",
        )
        .unwrap();
        earlier.save("job3", &SuccessArtifact::new("https://example.com/job3", "cached"));
    }

    let workers = common::scripted_workers(&script, &cache, 2, 2);
    let mut scheduler = BatchScheduler::new(workers, cache.clone(), Arc::new(NoOpProgress)).unwrap();
    let summary = scheduler.run(&jobs(&["job1", "job2", "job3"])).await;

    assert_eq!(summary.state, SchedulerState::Done);
    assert_eq!(summary.batches, 2);
    assert_eq!((summary.saved, summary.blocked, summary.skipped), (1, 1, 1));

    assert!(cache.exists("job1"));
    assert!(cache.error_exists("job2"));
    assert!(!cache.exists("job2"));
    assert_eq!(cache.get("job3").unwrap().content, "cached");
    assert_eq!(script.navigations_to("https://example.com/job3"), 0);

    assert_eq!(cache.counters().successes(), 1);
    assert_eq!(cache.counters().errors(), 1);
    assert_eq!(std::fs::read_dir(cache.success_dir()).unwrap().count(), 2);
    assert_eq!(std::fs::read_dir(cache.error_dir()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_empty_key_rows_are_tallied_apart() {
    let script = PageScript::new([
        ("https://example.com/a", ScriptedPage::Content("ok".into())),
        ("https://example.com/blank", ScriptedPage::Content("ok".into())),
    ]);
    let (_dir, cache) = common::temp_cache("run");
    let workers = common::scripted_workers(&script, &cache, 2, 0);
    let rows = vec![
        Job::new("a", "https://example.com/a"),
        Job::new(" / ", "https://example.com/blank"),
    ];

    let mut scheduler = BatchScheduler::new(workers, cache.clone(), Arc::new(NoOpProgress)).unwrap();
    let summary = scheduler.run(&rows).await;

    assert_eq!(summary.state, SchedulerState::Done);
    assert_eq!((summary.saved, summary.not_persisted), (1, 1));
    assert_eq!(summary.counters.successes, 1);
    assert_eq!(script.navigations_to("https://example.com/blank"), 1);
}

#[test]
fn test_empty_pool_is_rejected() {
    let (_dir, cache) = common::temp_cache("run");
    let workers: Vec<common::TimedRunner> = Vec::new();
    let result = BatchScheduler::new(workers, cache, Arc::new(NoOpProgress));
    assert!(matches!(result, Err(FetchError::Config(_))));
}
