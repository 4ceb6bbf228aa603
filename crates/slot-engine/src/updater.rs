//! Adaptive polling loop that fires callbacks when markers come due.
//!
//! A caller-supplied provider is asked for upcoming markers over a fixed
//! lookahead window. The loop sleeps until the earliest pending marker is
//! due (falling back to a short idle poll when none are pending), dispatches
//! each due marker's callback in its own task, and repeats until shut down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

/// An ephemeral scheduled instant. Consumed exactly once when its time
/// arrives; never retained afterwards.
pub trait Marker: Send + Sync {
    fn key(&self) -> &str;
    fn at(&self) -> DateTime<Utc>;
}

/// Supplies the upcoming markers for a `(from, to)` lookahead window.
///
/// Providers must not fail; on any internal error they return an empty list.
pub type MarkerProvider =
    Arc<dyn Fn(DateTime<Utc>, DateTime<Utc>) -> Vec<Arc<dyn Marker>> + Send + Sync>;

/// Callback invoked for each due marker. Every invocation runs in its own
/// task with no ordering or completion guarantee; callbacks that touch shared
/// state bring their own synchronization.
pub type MarkerCallback = Arc<dyn Fn(Arc<dyn Marker>) + Send + Sync>;

/// Tuning knobs for the polling loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// How far ahead the provider is asked for markers, in seconds.
    pub lookahead_secs: u64,
    /// Poll interval when no markers are pending, in seconds.
    pub idle_poll_secs: u64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            lookahead_secs: 3600,
            idle_poll_secs: 10,
        }
    }
}

impl UpdaterConfig {
    fn lookahead(&self) -> Duration {
        Duration::seconds(self.lookahead_secs as i64)
    }

    fn idle_poll(&self) -> StdDuration {
        StdDuration::from_secs(self.idle_poll_secs)
    }
}

struct Shared {
    markers: Mutex<Vec<Arc<dyn Marker>>>,
    wake: Notify,
    shutting_down: AtomicBool,
}

/// Dynamic event scheduler: polls a provider for markers and fires a callback
/// when each one comes due.
pub struct Updater {
    provider: MarkerProvider,
    on_marker: Option<MarkerCallback>,
    config: UpdaterConfig,
}

impl Updater {
    pub fn new(provider: MarkerProvider) -> Self {
        Self::with_config(provider, UpdaterConfig::default())
    }

    pub fn with_config(provider: MarkerProvider, config: UpdaterConfig) -> Self {
        Self {
            provider,
            on_marker: None,
            config,
        }
    }

    /// Register the callback invoked for each due marker.
    pub fn set_on_marker(&mut self, f: impl Fn(Arc<dyn Marker>) + Send + Sync + 'static) {
        self.on_marker = Some(Arc::new(f));
    }

    /// Fetch once, then spawn the polling loop.
    ///
    /// The returned handle is the only way to re-sync or stop the loop;
    /// dropping it without calling [`UpdaterHandle::shutdown`] detaches the
    /// task.
    pub fn run(self) -> UpdaterHandle {
        let shared = Arc::new(Shared {
            markers: Mutex::new(Vec::new()),
            wake: Notify::new(),
            shutting_down: AtomicBool::new(false),
        });

        fetch(&shared, &self.provider, &self.config);

        let task = tokio::spawn(run_loop(shared.clone(), self.on_marker, self.config.clone()));

        UpdaterHandle {
            shared,
            provider: self.provider,
            config: self.config,
            task,
        }
    }
}

/// Handle to a running [`Updater`] loop.
pub struct UpdaterHandle {
    shared: Arc<Shared>,
    provider: MarkerProvider,
    config: UpdaterConfig,
    task: JoinHandle<()>,
}

impl UpdaterHandle {
    /// Replace the marker list from the provider and force an immediate
    /// verification pass.
    pub fn sync(&self) {
        fetch(&self.shared, &self.provider, &self.config);
        self.shared.wake.notify_one();
    }

    /// Number of markers currently pending.
    pub fn pending(&self) -> usize {
        self.shared.markers.lock().len()
    }

    /// Stop the loop and wait for it to finish. Already-spawned callback
    /// tasks are not awaited.
    pub async fn shutdown(self) {
        self.shared.shutting_down.store(true, Ordering::Relaxed);
        // notify_one stores a permit when the loop is mid-iteration rather
        // than parked, so the next select completes immediately instead of
        // sleeping out the full wait.
        self.shared.wake.notify_one();

        if let Err(err) = self.task.await {
            error!("updater task failed: {err:?}");
        }
    }
}

fn fetch(shared: &Shared, provider: &MarkerProvider, config: &UpdaterConfig) {
    let now = Utc::now();
    let markers = provider(now, now + config.lookahead());
    debug!(count = markers.len(), "fetched markers");
    *shared.markers.lock() = markers;
}

async fn run_loop(shared: Arc<Shared>, on_marker: Option<MarkerCallback>, config: UpdaterConfig) {
    loop {
        if shared.shutting_down.load(Ordering::Relaxed) {
            break;
        }

        fire_due(&shared, on_marker.as_ref());

        let wait = next_wait(&shared, &config);
        if wait != config.idle_poll() {
            debug!(?wait, "updater wait");
        }

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shared.wake.notified() => {}
        }
    }
}

fn fire_due(shared: &Shared, on_marker: Option<&MarkerCallback>) {
    let now = Utc::now();

    let due: Vec<Arc<dyn Marker>> = {
        let mut markers = shared.markers.lock();
        let due = markers
            .iter()
            .filter(|marker| now > marker.at())
            .cloned()
            .collect();
        // Everything not strictly in the future is dropped, fired or not.
        markers.retain(|marker| marker.at() > now);
        due
    };

    let Some(callback) = on_marker else {
        return;
    };

    for marker in due {
        trace!(key = marker.key(), "marker due");
        let callback = callback.clone();
        tokio::spawn(async move { callback(marker) });
    }
}

fn next_wait(shared: &Shared, config: &UpdaterConfig) -> StdDuration {
    let markers = shared.markers.lock();

    let Some(earliest) = markers.iter().map(|marker| marker.at()).min() else {
        return config.idle_poll();
    };

    (earliest - Utc::now()).to_std().unwrap_or(StdDuration::ZERO)
}
