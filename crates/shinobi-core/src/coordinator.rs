// ── Poll coordinator ──
//
// Owns the periodic monitor-list poll for one NVR. Readers get a cheap
// `Arc` snapshot of the latest state; a failed poll keeps the previous
// map and flips `last_update_success` off until the next good poll.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use shinobi_api::{Monitor, MonitorId, ShinobiClient};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::CoreError;
use crate::store::MonitorMap;

/// Outcome of the most recent poll, plus the newest good data.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Map from the last successful poll. Empty until the first one.
    pub monitors: Arc<MonitorMap>,
    pub last_update_success: bool,
    /// Completion time of the last successful poll.
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
}

/// Periodic poller over [`ShinobiClient::list_monitors`].
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: Arc<ShinobiClient>,
    interval: Duration,
    state: ArcSwap<PollState>,
    /// Bumped after every poll attempt, good or bad.
    version: watch::Sender<u64>,
    /// Serialises polls so a manual refresh never races the timer.
    poll_lock: Mutex<()>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator. Nothing is fetched until [`first_refresh`]
    /// or [`refresh`] runs.
    ///
    /// [`first_refresh`]: Self::first_refresh
    /// [`refresh`]: Self::refresh
    pub fn new(client: Arc<ShinobiClient>, interval: Duration) -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                interval,
                state: ArcSwap::from_pointee(PollState::default()),
                version,
                poll_lock: Mutex::new(()),
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn client(&self) -> &Arc<ShinobiClient> {
        &self.inner.client
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    // ── Readers ──────────────────────────────────────────────────────

    pub fn state(&self) -> Arc<PollState> {
        self.inner.state.load_full()
    }

    /// The current monitor map (possibly stale after a failed poll).
    pub fn data(&self) -> Arc<MonitorMap> {
        Arc::clone(&self.inner.state.load().monitors)
    }

    pub fn monitor(&self, id: &MonitorId) -> Option<Arc<Monitor>> {
        self.inner.state.load().monitors.get(id).cloned()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.state.load().last_update_success
    }

    /// Subscribe to poll completions. The value is a monotonically
    /// increasing attempt counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Initial poll at setup time. Returns the underlying failure so the
    /// caller can tell auth problems from an unreachable NVR.
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        self.poll().await.map_err(CoreError::from)
    }

    /// Poll once. A failure is wrapped as [`CoreError::UpdateFailed`].
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.poll().await.map_err(|e| CoreError::UpdateFailed {
            message: e.to_string(),
            kind: e.kind(),
        })
    }

    /// Out-of-band poll after a write. Failure is already recorded in the
    /// state, so it is only logged here.
    pub async fn request_refresh(&self) {
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "requested refresh failed");
        }
    }

    async fn poll(&self) -> Result<(), shinobi_api::Error> {
        let _guard = self.inner.poll_lock.lock().await;
        let previous = self.inner.state.load_full();

        let result = self.inner.client.list_monitors().await;
        let next = match &result {
            Ok(monitors) => {
                let map = MonitorMap::from_monitors(monitors.iter().cloned());
                debug!(monitors = map.len(), "monitor list refreshed");
                if !previous.last_update_success && previous.last_error.is_some() {
                    info!("connection to Shinobi restored");
                }
                PollState {
                    monitors: Arc::new(map),
                    last_update_success: true,
                    last_updated: Some(Utc::now()),
                    last_error: None,
                }
            }
            Err(e) => {
                // Log the transition once; repeat failures stay at debug.
                if previous.last_update_success || previous.last_error.is_none() {
                    error!(error = %e, "error communicating with Shinobi API");
                } else {
                    debug!(error = %e, "Shinobi API still unavailable");
                }
                PollState {
                    monitors: Arc::clone(&previous.monitors),
                    last_update_success: false,
                    last_updated: previous.last_updated,
                    last_error: Some(e.to_string()),
                }
            }
        };

        self.inner.state.store(Arc::new(next));
        self.inner.version.send_modify(|v| *v += 1);
        result.map(|_| ())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the periodic poll task. A zero interval disables it; calling
    /// this twice is a no-op.
    pub async fn start(&self) {
        if self.inner.interval.is_zero() {
            debug!("periodic polling disabled");
            return;
        }

        let mut task = self.inner.task.lock().await;
        if task.is_some() || self.inner.cancel.is_cancelled() {
            return;
        }

        let cancel = self.inner.cancel.child_token();
        *task = Some(tokio::spawn(refresh_task(self.clone(), cancel)));
        debug!(interval_secs = self.inner.interval.as_secs(), "polling started");
    }

    /// Cancel the poll task and wait for it to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
        }
        debug!("coordinator stopped");
    }
}

/// Poll on a fixed cadence until cancelled.
async fn refresh_task(coordinator: Coordinator, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Outcome is recorded in the poll state.
                let _ = coordinator.refresh().await;
            }
        }
    }
}
