//! Tests for the marker polling loop.
//!
//! These use short real delays rather than mocked time: the updater reads the
//! wall clock for marker due-ness, so paused tokio time would not line up.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use slot_engine::{Marker, MarkerProvider, Updater};

struct TestMarker {
    key: String,
    at: DateTime<Utc>,
}

impl Marker for TestMarker {
    fn key(&self) -> &str {
        &self.key
    }

    fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

fn marker(key: &str, at: DateTime<Utc>) -> Arc<dyn Marker> {
    Arc::new(TestMarker {
        key: key.to_string(),
        at,
    })
}

#[tokio::test]
async fn fires_the_callback_once_per_due_marker() {
    let provider: MarkerProvider = Arc::new(|_from, _to| {
        let now = Utc::now();
        vec![
            marker("first", now + Duration::milliseconds(150)),
            marker("second", now + Duration::milliseconds(300)),
        ]
    });

    let calls = Arc::new(AtomicUsize::new(0));

    let mut updater = Updater::new(provider);
    let counted = calls.clone();
    updater.set_on_marker(move |_marker| {
        counted.fetch_add(1, Ordering::SeqCst);
    });

    let handle = updater.run();
    assert_eq!(handle.pending(), 2);

    tokio::time::sleep(StdDuration::from_millis(700)).await;
    handle.shutdown().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn due_markers_are_consumed_exactly_once() {
    let provider: MarkerProvider = Arc::new(|_from, _to| {
        vec![marker("past", Utc::now() - Duration::seconds(1))]
    });

    let calls = Arc::new(AtomicUsize::new(0));

    let mut updater = Updater::new(provider);
    let counted = calls.clone();
    updater.set_on_marker(move |_marker| {
        counted.fetch_add(1, Ordering::SeqCst);
    });

    let handle = updater.run();
    tokio::time::sleep(StdDuration::from_millis(200)).await;

    // Fired and removed from the pending list.
    assert_eq!(handle.pending(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    handle.shutdown().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn shutdown_stops_an_idle_loop_promptly() {
    let provider: MarkerProvider = Arc::new(|_from, _to| Vec::new());

    let updater = Updater::new(provider);
    let handle = updater.run();

    // The idle loop sleeps for the full idle poll; shutdown must not wait it out.
    tokio::time::timeout(StdDuration::from_secs(1), handle.shutdown())
        .await
        .expect("shutdown should interrupt the idle sleep");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_interrupts_an_armed_sleep() {
    let provider: MarkerProvider =
        Arc::new(|_from, _to| vec![marker("far", Utc::now() + Duration::minutes(30))]);

    let updater = Updater::new(provider);
    let handle = updater.run();
    assert_eq!(handle.pending(), 1);

    // The loop arms a ~30 minute sleep. Shutdown must complete immediately
    // whether the loop is parked in its select or still mid-iteration.
    tokio::time::timeout(StdDuration::from_secs(2), handle.shutdown())
        .await
        .expect("shutdown should interrupt the armed sleep");
}

#[tokio::test]
async fn sync_replaces_the_marker_list_wholesale() {
    let fetches = Arc::new(AtomicUsize::new(0));

    let counted = fetches.clone();
    let provider: MarkerProvider = Arc::new(move |_from, _to| {
        let n = counted.fetch_add(1, Ordering::SeqCst);
        let far = Utc::now() + Duration::minutes(30);
        if n == 0 {
            vec![marker("a", far)]
        } else {
            vec![marker("b", far), marker("c", far)]
        }
    });

    let updater = Updater::new(provider);
    let handle = updater.run();
    assert_eq!(handle.pending(), 1);

    handle.sync();
    assert_eq!(handle.pending(), 2);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);

    handle.shutdown().await;
}

#[tokio::test]
async fn markers_without_a_callback_are_still_cleaned() {
    let provider: MarkerProvider = Arc::new(|_from, _to| {
        vec![marker("past", Utc::now() - Duration::seconds(1))]
    });

    let updater = Updater::new(provider);
    let handle = updater.run();

    tokio::time::sleep(StdDuration::from_millis(100)).await;
    assert_eq!(handle.pending(), 0);

    handle.shutdown().await;
}
