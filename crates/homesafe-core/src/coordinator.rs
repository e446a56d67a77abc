// ── Polling coordinator ──
//
// Single owner of fleet state. Refreshes are single-flight: concurrent
// triggers attach to the cycle already running instead of starting a
// second fetch. A successful cycle swaps in a new immutable snapshot; a
// failed one leaves the last good snapshot in place.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::command::{CommandDispatcher, CommandKind};
use crate::config::CoordinatorConfig;
use crate::error::{CoreError, FailureKind, RefreshError};
use crate::model::VendorId;
use crate::snapshot::{FleetSnapshot, RawFleet};
use crate::transport::FleetTransport;

type RefreshResult = Result<Arc<FleetSnapshot>, RefreshError>;
type InFlight = Shared<BoxFuture<'static, RefreshResult>>;

/// Coordinator phase, published through [`Coordinator::watch_state`].
///
/// `Ready` and `Failed` are both resting states: the coordinator is idle
/// and the variant records how the last cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No cycle has run yet.
    Idle,
    Fetching,
    Ready,
    Failed(FailureKind),
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Fetching => f.write_str("fetching"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Polls the vendor cloud and serves the last good fleet snapshot.
///
/// Cheap to clone; every clone shares the same state.
pub struct Coordinator<T: FleetTransport> {
    inner: Arc<CoordinatorInner<T>>,
}

impl<T: FleetTransport> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<T: FleetTransport> {
    config: CoordinatorConfig,
    transport: Arc<T>,
    dispatcher: CommandDispatcher<T>,
    snapshot: ArcSwapOption<FleetSnapshot>,
    snapshot_tx: watch::Sender<Option<Arc<FleetSnapshot>>>,
    state: watch::Sender<CoordinatorState>,
    needs_reauth: AtomicBool,
    last_error: ArcSwapOption<RefreshError>,
    generation: AtomicU64,
    /// The cycle currently running, if any. Held only long enough to
    /// clone or replace; never across an await.
    in_flight: std::sync::Mutex<Option<InFlight>>,
    cancel: CancellationToken,
    /// Cancelled on shutdown, replaced on the next start.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: FleetTransport> Coordinator<T> {
    /// Create a coordinator. Does not fetch; call [`refresh()`](Self::refresh)
    /// or [`start()`](Self::start).
    pub fn new(config: CoordinatorConfig, transport: Arc<T>) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (state, _) = watch::channel(CoordinatorState::Idle);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                dispatcher: CommandDispatcher::new(Arc::clone(&transport)),
                transport,
                snapshot: ArcSwapOption::empty(),
                snapshot_tx,
                state,
                needs_reauth: AtomicBool::new(false),
                last_error: ArcSwapOption::empty(),
                generation: AtomicU64::new(0),
                in_flight: std::sync::Mutex::new(None),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one poll cycle, or attach to the one already in flight.
    ///
    /// Every caller attached to a cycle receives the same outcome. On
    /// failure the cached snapshot is left untouched.
    pub async fn refresh(&self) -> RefreshResult {
        self.join_or_start_cycle().await
    }

    fn join_or_start_cycle(&self) -> InFlight {
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(cycle) = slot.as_ref() {
            debug!("refresh already in flight, attaching");
            return cycle.clone();
        }

        // The cycle runs on its own task so that a caller dropping its
        // future does not abandon the others attached to it.
        let this = self.clone();
        let handle = tokio::spawn(async move { this.run_cycle().await });
        let cycle = async move {
            handle.await.unwrap_or_else(|e| {
                Err(RefreshError::transient(format!("refresh task aborted: {e}")))
            })
        }
        .boxed()
        .shared();

        *slot = Some(cycle.clone());
        cycle
    }

    async fn run_cycle(&self) -> RefreshResult {
        self.inner.state.send_replace(CoordinatorState::Fetching);
        let timeout = self.inner.config.fetch_timeout;

        let outcome =
            match tokio::time::timeout(timeout, self.inner.transport.fetch_fleet()).await {
                Ok(Ok(raw)) => Ok(self.commit(raw)),
                Ok(Err(e)) => Err(RefreshError::from(&e)),
                Err(_) => Err(RefreshError::timed_out("fleet fetch", timeout.as_secs())),
            };

        match &outcome {
            Ok(snapshot) => {
                self.inner.needs_reauth.store(false, Ordering::SeqCst);
                self.inner.last_error.store(None);
                self.inner.state.send_replace(CoordinatorState::Ready);
                debug!(
                    generation = snapshot.generation(),
                    devices = snapshot.len(),
                    "fleet snapshot replaced"
                );
            }
            Err(e) => self.record_failure(e),
        }

        *self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        outcome
    }

    /// Build and publish a snapshot. Readers see either the previous
    /// snapshot or this one, never a mix.
    fn commit(&self, raw: RawFleet) -> Arc<FleetSnapshot> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(FleetSnapshot::with_generation(raw, generation, Utc::now()));
        self.inner.snapshot.store(Some(Arc::clone(&snapshot)));
        self.inner
            .snapshot_tx
            .send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    fn record_failure(&self, err: &RefreshError) {
        if err.is_auth() {
            self.inner.needs_reauth.store(true, Ordering::SeqCst);
            warn!(error = %err, "fleet refresh rejected, re-authorization required");
        } else {
            warn!(error = %err, "fleet refresh failed, keeping last snapshot");
        }
        self.inner.last_error.store(Some(Arc::new(err.clone())));
        self.inner
            .state
            .send_replace(CoordinatorState::Failed(err.kind));
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The last good snapshot. `None` until the first successful cycle,
    /// which is distinct from a snapshot with zero devices.
    pub fn snapshot(&self) -> Option<Arc<FleetSnapshot>> {
        self.inner.snapshot.load_full()
    }

    /// Receive every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<FleetSnapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    /// Set after a cycle fails authentication; cleared by a successful
    /// cycle or [`reauthenticated()`](Self::reauthenticated).
    pub fn needs_reauth(&self) -> bool {
        self.inner.needs_reauth.load(Ordering::SeqCst)
    }

    /// The most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<RefreshError> {
        self.inner.last_error.load_full().map(|e| (*e).clone())
    }

    /// Signal that the session has been re-established and refresh now.
    pub async fn reauthenticated(&self) -> RefreshResult {
        info!("re-authorization reported, resuming polling");
        self.inner.needs_reauth.store(false, Ordering::SeqCst);
        self.refresh().await
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run a first refresh and spawn the background poll task.
    ///
    /// The poll task is spawned even when the first refresh fails; its
    /// outcome is returned so the caller can report it.
    pub async fn start(&self) -> RefreshResult {
        let first = self.refresh().await;

        let mut handles = self.inner.task_handles.lock().await;
        let period = self.inner.config.update_interval;
        if period.is_zero() {
            debug!("update interval is zero, background polling disabled");
        } else if handles.is_empty() {
            let mut child = self.inner.cancel_child.lock().await;
            if child.is_cancelled() {
                *child = self.inner.cancel.child_token();
            }
            let cancel = child.clone();
            let this = self.clone();
            handles.push(tokio::spawn(poll_task(this, period, cancel)));
            info!(interval_secs = period.as_secs(), "background polling started");
        } else {
            debug!("poll task already running");
        }

        first
    }

    /// Stop background polling and wait for the task to exit. A poll cycle
    /// already in flight is not waited for. The cached snapshot stays
    /// readable.
    pub async fn shutdown(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator shut down");
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Send a command to a device in the current snapshot.
    ///
    /// Checks that the device's hardware family accepts the command. The
    /// cache is not updated; the effect shows up in a later poll.
    pub async fn execute(&self, device_id: &VendorId, command: CommandKind) -> Result<(), CoreError> {
        let snapshot = self.snapshot().ok_or(CoreError::NoSnapshot)?;
        let device = snapshot
            .device(device_id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device_id.to_string(),
            })?;

        let class = device.model_class();
        if !catalog::accepts(class.class, command) {
            return Err(CoreError::Unsupported {
                operation: command.to_string(),
                model: class.label,
            });
        }

        self.inner.dispatcher.send(&device.identity(), command).await
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task<T: FleetTransport>(
    coordinator: Coordinator<T>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if coordinator.needs_reauth() {
                    debug!("skipping poll, re-authorization required");
                    continue;
                }
                // Failures are logged by the cycle itself. The cycle runs
                // on its own task, so abandoning it here does not cut it short.
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = coordinator.refresh() => {}
                }
            }
        }
    }
}
