//! Keeps a filtered, cached inspection list consistent with the remote store.
//!
//! Three triggers feed the same guarded refresh: the initial fetch in
//! [`SyncCoordinator::start`], a fixed-interval poll, and debounced
//! `Created`/`Updated`/`Refresh` events from the [`EventBus`]. Overlapping
//! refreshes are coalesced rather than queued.

mod debounce;
mod snapshot;

pub use debounce::Debouncer;
pub use snapshot::InspectionCounts;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::domain::{Inspection, InspectionFilter, InspectionId, InspectionStatus};
use super::events::{EventBus, InspectionEvent};
use super::repository::{InspectionStore, Notice, NoticeLevel, StoreError, SyncNotifier};
use crate::config::SyncTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            debounce_window: Duration::from_millis(500),
        }
    }
}

impl From<SyncTuning> for SyncSettings {
    fn from(tuning: SyncTuning) -> Self {
        Self {
            poll_interval: tuning.poll_interval,
            debounce_window: tuning.debounce_window,
        }
    }
}

/// Health of the cached list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error,
    /// Only set through [`SyncCoordinator::mark_stale`].
    Stale,
}

/// What a single refresh attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Another refresh was already in flight.
    Coalesced,
    Unchanged,
    Changed,
    Failed,
}

#[derive(Debug, Default)]
struct SyncState {
    inspections: Vec<Inspection>,
    status: SyncStatus,
    error: Option<String>,
    last_synced: Option<DateTime<Utc>>,
}

/// Serializable view of the coordinator for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSnapshot {
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub last_synced: Option<DateTime<Utc>>,
    pub remote_fetches: u64,
    pub inspection_count: usize,
    pub counts: InspectionCounts,
}

struct Shared<S> {
    store: Arc<S>,
    bus: EventBus,
    notifier: Arc<dyn SyncNotifier>,
    filter: InspectionFilter,
    state: RwLock<SyncState>,
    in_flight: AtomicBool,
    remote_fetches: AtomicU64,
    debouncer: Debouncer,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S> Shared<S>
where
    S: InspectionStore + 'static,
{
    async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("inspection refresh already in flight");
            return RefreshOutcome::Coalesced;
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.write_state().status = SyncStatus::Syncing;
        let result = self.store.list_inspections(&self.filter).await;
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);

        match result {
            Ok(fetched) => {
                let changed_count = {
                    let mut state = self.write_state();
                    state.status = SyncStatus::Idle;
                    state.error = None;
                    state.last_synced = Some(Utc::now());
                    if snapshot::has_changed(&state.inspections, &fetched) {
                        let count = fetched.len();
                        state.inspections = fetched;
                        Some(count)
                    } else {
                        None
                    }
                };

                match changed_count {
                    Some(count) => {
                        debug!(count, "inspection list changed");
                        self.bus.publish(InspectionEvent::DataChanged { count });
                        RefreshOutcome::Changed
                    }
                    None => RefreshOutcome::Unchanged,
                }
            }
            Err(err) => {
                let message = err.to_string();
                {
                    let mut state = self.write_state();
                    state.status = SyncStatus::Error;
                    state.error = Some(message.clone());
                }
                warn!(error = %message, "inspection sync failed");
                self.notifier.notify(Notice {
                    level: NoticeLevel::Error,
                    title: "Inspection sync failed".to_string(),
                    message,
                });
                RefreshOutcome::Failed
            }
        }
    }

    fn schedule_refresh(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        self.debouncer.schedule(async move {
            shared.refresh().await;
        });
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SyncState> {
        self.state.write().expect("sync state lock poisoned")
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SyncState> {
        self.state.read().expect("sync state lock poisoned")
    }

    /// Apply `patch` to the cached row, returning its previous value.
    fn patch_local<F>(&self, id: &InspectionId, patch: F) -> Option<Inspection>
    where
        F: FnOnce(&mut Inspection),
    {
        let mut state = self.write_state();
        let entry = state
            .inspections
            .iter_mut()
            .find(|inspection| &inspection.id == id)?;
        let previous = entry.clone();
        patch(entry);
        Some(previous)
    }

    fn restore_local(&self, previous: Inspection) {
        let mut state = self.write_state();
        if let Some(entry) = state
            .inspections
            .iter_mut()
            .find(|inspection| inspection.id == previous.id)
        {
            *entry = previous;
        }
    }

    /// Fold the store's copy of a row into the cache.
    ///
    /// Returns the new row count when the row entered or left the filtered list.
    fn reconcile_local(&self, updated: Inspection) -> Option<usize> {
        let keep = self.filter.matches(&updated);
        let mut state = self.write_state();
        let position = state
            .inspections
            .iter()
            .position(|inspection| inspection.id == updated.id);
        match (position, keep) {
            (Some(index), true) => {
                state.inspections[index] = updated;
                None
            }
            (Some(index), false) => {
                state.inspections.remove(index);
                Some(state.inspections.len())
            }
            (None, true) => {
                let index = state
                    .inspections
                    .iter()
                    .position(|inspection| inspection.id > updated.id)
                    .unwrap_or(state.inspections.len());
                state.inspections.insert(index, updated);
                Some(state.inspections.len())
            }
            (None, false) => None,
        }
    }
}

/// Owner of one cached inspection list per filter set.
pub struct SyncCoordinator<S>
where
    S: InspectionStore + 'static,
{
    shared: Arc<Shared<S>>,
    settings: SyncSettings,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S> SyncCoordinator<S>
where
    S: InspectionStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        bus: EventBus,
        notifier: Arc<dyn SyncNotifier>,
        filter: InspectionFilter,
        settings: SyncSettings,
    ) -> Self {
        let shared = Arc::new(Shared {
            store,
            bus,
            notifier,
            filter,
            state: RwLock::new(SyncState::default()),
            in_flight: AtomicBool::new(false),
            remote_fetches: AtomicU64::new(0),
            debouncer: Debouncer::new(settings.debounce_window),
        });

        Self {
            shared,
            settings,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn filter(&self) -> &InspectionFilter {
        &self.shared.filter
    }

    /// Run the initial fetch, then spawn the poll loop and event listener.
    pub async fn start(&self) -> RefreshOutcome {
        let mut events = self.shared.bus.subscribe();
        let outcome = self.shared.refresh().await;

        let poll = {
            let shared = Arc::clone(&self.shared);
            let period = self.settings.poll_interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    shared.refresh().await;
                }
            })
        };

        let listener = {
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) if event.triggers_refetch() => {
                            debug!(event = event.name(), "scheduling debounced refresh");
                            shared.schedule_refresh();
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "inspection event listener lagged");
                            shared.schedule_refresh();
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        };

        self.tasks
            .lock()
            .expect("sync task mutex poisoned")
            .extend([poll, listener]);

        info!(
            filter = ?self.shared.filter,
            poll_secs = self.settings.poll_interval.as_secs(),
            "inspection sync started"
        );
        outcome
    }

    /// Abort background tasks and any pending debounce timer.
    ///
    /// An in-flight store request is not cancelled; its result still lands in
    /// the cache.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock().expect("sync task mutex poisoned");
        for task in tasks.drain(..) {
            task.abort();
        }
        self.shared.debouncer.cancel();
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        self.shared.refresh().await
    }

    /// Schedule a debounced refresh as if a change event had arrived.
    pub fn request_refresh(&self) {
        self.shared.schedule_refresh();
    }

    pub fn cancel_pending_refresh(&self) -> bool {
        self.shared.debouncer.cancel()
    }

    pub fn mark_stale(&self) {
        self.shared.write_state().status = SyncStatus::Stale;
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.read_state().status
    }

    pub fn error(&self) -> Option<String> {
        self.shared.read_state().error.clone()
    }

    pub fn inspections(&self) -> Vec<Inspection> {
        self.shared.read_state().inspections.clone()
    }

    pub fn remote_fetches(&self) -> u64 {
        self.shared.remote_fetches.load(Ordering::Relaxed)
    }

    pub fn counts(&self, today: NaiveDate) -> InspectionCounts {
        InspectionCounts::tally(&self.shared.read_state().inspections, today)
    }

    pub fn snapshot(&self, today: NaiveDate) -> SyncSnapshot {
        let state = self.shared.read_state();
        SyncSnapshot {
            status: state.status,
            error: state.error.clone(),
            last_synced: state.last_synced,
            remote_fetches: self.remote_fetches(),
            inspection_count: state.inspections.len(),
            counts: InspectionCounts::tally(&state.inspections, today),
        }
    }

    /// Optimistically patch the cached row, then write through to the store.
    ///
    /// A failed write rolls the cached row back before the error is returned.
    pub async fn update_inspection_status(
        &self,
        id: &InspectionId,
        status: InspectionStatus,
    ) -> Result<Inspection, StoreError> {
        let previous = self
            .shared
            .patch_local(id, |inspection| inspection.status = status);

        match self.shared.store.update_status(id, status, None).await {
            Ok(updated) => {
                if let Some(count) = self.shared.reconcile_local(updated.clone()) {
                    self.shared.bus.publish(InspectionEvent::DataChanged { count });
                }
                self.shared.bus.publish(InspectionEvent::StatusChanged {
                    id: id.clone(),
                    status,
                });
                info!(inspection_id = %id, status = status.label(), "inspection status updated");
                Ok(updated)
            }
            Err(err) => {
                if let Some(previous) = previous {
                    self.shared.restore_local(previous);
                }
                warn!(inspection_id = %id, error = %err, "status update failed; rolled back");
                Err(err)
            }
        }
    }
}

impl<S> Drop for SyncCoordinator<S>
where
    S: InspectionStore + 'static,
{
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.get_mut() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
        self.shared.debouncer.cancel();
    }
}
