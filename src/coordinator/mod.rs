//! Update coordinator: one periodic fetch per configured team, one cached
//! snapshot, fan-out to subscribed listeners.
//!
//! The coordinator owns the only mutable state in the process. Entities
//! (the sensor projection, the status server) never fetch anything
//! themselves; they read the last-known-good snapshot and get poked through
//! their listener callback after every refresh attempt. A failed fetch
//! never tears anything down — it leaves the previous snapshot in place and
//! flips the staleness signal until the next successful tick.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{GameRecord, StatusFetcher};

/// Original integration default: give the API two minutes per request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Scoreboard data moves slowly outside live innings; poll every 10 minutes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(600);

/// Immutable-at-creation configuration for one coordinator instance.
/// The team id can never change; display name and timeout can be adjusted
/// later through [`UpdateCoordinator::set_options`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub team_id: String,
    pub name: String,
    pub timeout: Duration,
    pub update_interval: Duration,
}

impl CoordinatorConfig {
    fn validate(&self) -> Result<(), CoordinatorError> {
        if self.team_id.trim().is_empty() {
            return Err(CoordinatorError::EmptyTeamId);
        }
        if self.timeout.is_zero() {
            return Err(CoordinatorError::ZeroTimeout);
        }
        if self.update_interval.is_zero() {
            return Err(CoordinatorError::ZeroInterval);
        }
        Ok(())
    }
}

/// Configuration mistakes are rejected when the coordinator is created,
/// never at refresh time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("team identifier must not be empty")]
    EmptyTeamId,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("update interval must be greater than zero")]
    ZeroInterval,
}

/// Snapshot staleness, distinguishing "never had data" from "had data, now
/// failing" (the original exposed only a boolean and conflated the two).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    #[default]
    NeverFetched,
    Fresh,
    Stale,
}

/// Callback invoked after every refresh attempt, success or failure.
/// Listeners read coordinator state; they must not perform I/O.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`UpdateCoordinator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

#[derive(Default)]
struct CoordState {
    snapshot: Option<GameRecord>,
    last_success: bool,
    last_attempt: Option<DateTime<Utc>>,
    freshness: Freshness,
}

struct Options {
    name: String,
    timeout: Duration,
}

struct Inner {
    team_id: String,
    update_interval: Duration,
    options: RwLock<Options>,
    fetcher: Arc<dyn StatusFetcher>,
    state: RwLock<CoordState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    /// Serializes refreshes: at most one fetch in flight per instance.
    refresh_lock: tokio::sync::Mutex<()>,
    disposed: AtomicBool,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.tick_task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}

/// Thread-safe handle to one team's polling state. Cheap to clone; all
/// clones share the same snapshot, listener set, and tick task.
#[derive(Clone)]
pub struct UpdateCoordinator {
    inner: Arc<Inner>,
}

impl UpdateCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        fetcher: Arc<dyn StatusFetcher>,
    ) -> Result<Self, CoordinatorError> {
        config.validate()?;
        debug!(
            "Status for '{}' ({}) will be updated every {:?} via {}",
            config.name,
            config.team_id,
            config.update_interval,
            fetcher.name()
        );
        Ok(UpdateCoordinator {
            inner: Arc::new(Inner {
                team_id: config.team_id,
                update_interval: config.update_interval,
                options: RwLock::new(Options {
                    name: config.name,
                    timeout: config.timeout,
                }),
                fetcher,
                state: RwLock::new(CoordState::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                refresh_lock: tokio::sync::Mutex::new(()),
                disposed: AtomicBool::new(false),
                tick_task: Mutex::new(None),
            }),
        })
    }

    /// Fetch once and publish the outcome. Failures are absorbed: the
    /// previous snapshot stays in place and only the staleness signal moves.
    /// Concurrent calls are serialized; a call arriving mid-flight runs
    /// immediately after the in-flight one completes.
    pub async fn refresh(&self) {
        if self.is_disposed() {
            return;
        }
        let _in_flight = self.inner.refresh_lock.lock().await;
        if self.is_disposed() {
            return;
        }

        let timeout = self.options_read().timeout;
        let started = Utc::now();
        let result = self.inner.fetcher.fetch(&self.inner.team_id, timeout).await;

        // Disposal during the fetch: let the request finish, drop the result.
        if self.is_disposed() {
            debug!("Discarding fetch result for disposed coordinator ({})", self.inner.team_id);
            return;
        }

        {
            let mut state = self.state_write();
            state.last_attempt = Some(started);
            match result {
                Ok(record) => {
                    debug!("Refreshed status for team {}", self.inner.team_id);
                    state.snapshot = Some(record);
                    state.last_success = true;
                    state.freshness = Freshness::Fresh;
                }
                Err(e) => {
                    warn!("Status fetch for team {} failed: {}", self.inner.team_id, e);
                    state.last_success = false;
                    if state.snapshot.is_some() {
                        state.freshness = Freshness::Stale;
                    }
                }
            }
        }

        self.notify_listeners();
    }

    /// Spawn the periodic tick task. Idempotent: a coordinator runs at most
    /// one tick task, and a disposed coordinator spawns none.
    pub fn start(&self) {
        let mut slot = self.tick_task_lock();
        if self.is_disposed() || slot.is_some() {
            return;
        }
        let coordinator = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(coordinator.inner.update_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; the initial refresh runs
            // before start(), so skip it rather than fetch twice at startup.
            interval.tick().await;
            loop {
                interval.tick().await;
                coordinator.refresh().await;
            }
        });
        *slot = Some(handle);
        info!(
            "Started polling team {} every {:?}",
            self.inner.team_id, self.inner.update_interval
        );
    }

    /// Register a listener; it fires after every subsequent refresh attempt,
    /// in registration order.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        if !self.is_disposed() {
            self.listeners_lock().push((id, listener));
        }
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.listeners_lock().retain(|(id, _)| *id != subscription.0);
    }

    /// Adjust display name and/or timeout without recreating the instance.
    /// The team identifier is fixed for the coordinator's lifetime.
    pub fn set_options(
        &self,
        name: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<(), CoordinatorError> {
        if matches!(timeout, Some(t) if t.is_zero()) {
            return Err(CoordinatorError::ZeroTimeout);
        }
        let mut options = self.options_write();
        if let Some(name) = name {
            options.name = name;
        }
        if let Some(timeout) = timeout {
            options.timeout = timeout;
        }
        Ok(())
    }

    /// Tear the instance down: cancel the tick task, drop all listeners,
    /// ignore any in-flight fetch result. Terminal — refresh and subscribe
    /// become no-ops.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.tick_task_lock().take() {
            handle.abort();
        }
        self.listeners_lock().clear();
        info!("Coordinator for team {} disposed", self.inner.team_id);
    }

    /// Clone of the most recent successfully fetched record, if any.
    pub fn current_snapshot(&self) -> Option<GameRecord> {
        self.state_read().snapshot.clone()
    }

    /// Whether the most recent refresh attempt succeeded.
    pub fn last_success(&self) -> bool {
        self.state_read().last_success
    }

    pub fn freshness(&self) -> Freshness {
        self.state_read().freshness
    }

    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.state_read().last_attempt
    }

    pub fn team_id(&self) -> &str {
        &self.inner.team_id
    }

    pub fn name(&self) -> String {
        self.options_read().name.clone()
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    fn notify_listeners(&self) {
        // Snapshot the set before invoking anything, so callbacks can
        // subscribe or unsubscribe without deadlocking, and members removed
        // before this pass began never fire.
        let pass: Vec<Listener> = self
            .listeners_lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in pass {
            listener();
        }
    }

    fn state_read(&self) -> RwLockReadGuard<'_, CoordState> {
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, CoordState> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn options_read(&self) -> RwLockReadGuard<'_, Options> {
        self.inner.options.read().unwrap_or_else(|e| e.into_inner())
    }

    fn options_write(&self) -> RwLockWriteGuard<'_, Options> {
        self.inner.options.write().unwrap_or_else(|e| e.into_inner())
    }

    fn listeners_lock(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.inner.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn tick_task_lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.tick_task.lock().unwrap_or_else(|e| e.into_inner())
    }
}
