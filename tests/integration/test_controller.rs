// Job controller behaviour: event ordering, cache write-through,
// cancellation, and submit-replaces semantics.

use chrono::{TimeZone, Utc};

use bitcents::calibration::CalibrationData;
use bitcents::engine::{JobController, JobEvent, JobState, Sensitivity, SimRequest};
use bitcents::models::Target;

use crate::helpers::seeded_config;

fn request(paths: usize, seed: u64) -> SimRequest {
    SimRequest {
        market_id: "BTC-3PM".to_string(),
        spot: 60_000.0,
        hours_to_close: 1.0,
        target: Target::Above { strike: 60_500.0 },
        calibration: CalibrationData::default_bundle(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ),
        sensitivity: Sensitivity::default(),
        config: seeded_config(paths, seed),
    }
}

/// Drain a job's events into (progress snapshots, terminal event).
async fn drain(
    controller: &mut JobController,
    id: bitcents::engine::JobId,
) -> (Vec<bitcents::models::ProgressSnapshot>, JobEvent) {
    let mut events = controller.events(id).expect("event stream");
    let mut progress = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            JobEvent::Progress(snapshot) => progress.push(snapshot),
            terminal => return (progress, terminal),
        }
    }
    panic!("event stream ended without a terminal event");
}

#[tokio::test]
async fn progress_then_complete_in_batch_order() {
    let mut controller = JobController::new();
    let id = controller.submit(request(4_000, 42)).unwrap();
    let (progress, terminal) = drain(&mut controller, id).await;

    assert_eq!(progress.len(), 10);
    for (i, snapshot) in progress.iter().enumerate() {
        assert_eq!(snapshot.batch, i);
    }
    let result = match terminal {
        JobEvent::Complete(result) => result,
        other => panic!("expected Complete, got {:?}", other),
    };
    assert_eq!(result.diagnostics.n_paths, 4_000);
    assert_eq!(controller.state(id), Some(JobState::Complete));
}

#[tokio::test]
async fn completed_jobs_are_served_from_cache() {
    let mut controller = JobController::new();

    let first = controller.submit(request(4_000, 42)).unwrap();
    let (progress, terminal) = drain(&mut controller, first).await;
    assert!(!progress.is_empty());
    let first_result = match terminal {
        JobEvent::Complete(result) => result,
        other => panic!("expected Complete, got {:?}", other),
    };

    // Identical fingerprint: the second job must complete instantly with
    // the cached result and no simulation progress.
    let second = controller.submit(request(4_000, 42)).unwrap();
    assert_ne!(first, second);
    let (progress, terminal) = drain(&mut controller, second).await;
    assert!(progress.is_empty());
    match terminal {
        JobEvent::Complete(result) => assert_eq!(result, first_result),
        other => panic!("expected cached Complete, got {:?}", other),
    }
}

#[tokio::test]
async fn cancellation_suppresses_completion_and_caching() {
    let mut controller = JobController::new();

    // Big enough that the worker is still mid-run when we cancel.
    let id = controller.submit(request(500_000, 42)).unwrap();
    let mut events = controller.events(id).expect("event stream");

    // Wait for the first batch so the job is demonstrably running.
    let first = events.recv().await.expect("first event");
    assert!(matches!(first, JobEvent::Progress(_)));

    controller.cancel();

    let mut saw_cancelled = false;
    while let Some(event) = events.recv().await {
        match event {
            JobEvent::Progress(_) => {} // batches already in flight may land
            JobEvent::Cancelled => {
                saw_cancelled = true;
                break;
            }
            JobEvent::Complete(_) => panic!("cancelled job must not complete"),
            JobEvent::Error(message) => panic!("unexpected error: {}", message),
        }
    }
    assert!(saw_cancelled);
    assert_eq!(controller.state(id), Some(JobState::Cancelled));

    // Nothing was cached: an identical request must simulate again (cache
    // hits produce zero progress events).
    let retry = controller.submit(request(2_000, 42)).unwrap();
    let (progress, terminal) = drain(&mut controller, retry).await;
    assert!(!progress.is_empty(), "cancelled job leaked a cache entry");
    assert!(matches!(terminal, JobEvent::Complete(_)));
}

#[tokio::test]
async fn submit_while_running_cancels_and_replaces() {
    let mut controller = JobController::new();

    let first = controller.submit(request(500_000, 42)).unwrap();
    let mut first_events = controller.events(first).expect("event stream");
    let head = first_events.recv().await.expect("first event");
    assert!(matches!(head, JobEvent::Progress(_)));

    // Different market id → different fingerprint, fresh simulation.
    let mut replacement = request(2_000, 7);
    replacement.market_id = "BTC-4PM".to_string();
    let second = controller.submit(replacement).unwrap();

    // Old job is gone from the controller's view.
    assert_eq!(controller.state(first), None);

    // The replaced worker winds down with Cancelled (never Complete).
    let mut saw_cancelled = false;
    while let Some(event) = first_events.recv().await {
        match event {
            JobEvent::Progress(_) => {}
            JobEvent::Cancelled => {
                saw_cancelled = true;
                break;
            }
            other => panic!("replaced job emitted {:?}", other),
        }
    }
    assert!(saw_cancelled);

    // The new job runs to completion.
    let (_, terminal) = drain(&mut controller, second).await;
    assert!(matches!(terminal, JobEvent::Complete(_)));
}

#[tokio::test]
async fn invalid_requests_are_rejected_at_submit() {
    let mut controller = JobController::new();
    let mut bad = request(1_000, 1);
    bad.spot = -5.0;
    assert!(controller.submit(bad).is_err());

    let mut bad_mult = request(1_000, 1);
    bad_mult.sensitivity.vol_mult = 2.0;
    assert!(controller.submit(bad_mult).is_err());
}
