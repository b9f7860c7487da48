//! Reconciliation between the local store and the remote mirror.
//!
//! Two operations, both safe to repeat for the same record but not
//! transactional as a whole:
//!
//! * pull-merge copies every remote record into the store, upserting by
//!   remote id through the `remote_links` table so repeated pulls do not
//!   duplicate habits;
//! * push-one creates a single local habit on the remote and remembers the
//!   remote id it was given.
//!
//! Failed pushes are recorded but never retried automatically.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::models::{Habit, RemoteHabit, SyncState};
use crate::remote::RemoteMirror;
use crate::services::{HabitStore, Upsert};
use crate::Result;

/// Counts from a successful pull-merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Result of a pull-merge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// Remote list fetched and merged
    Merged(PullReport),
    /// Another pull or a push was in flight; this request was folded into it
    AlreadyRunning,
    /// Remote could not be listed; nothing changed locally
    Unreachable(String),
    /// The local store failed part-way through the merge
    Failed(String),
}

/// Per-state counts of local habits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub synced: usize,
    pub pending: usize,
    pub failed: usize,
    /// Habits never pushed nor pulled
    pub local_only: usize,
}

/// Moves habits between a [`HabitStore`] and a [`RemoteMirror`].
#[derive(Clone)]
pub struct Synchronizer {
    store: HabitStore,
    remote: Arc<dyn RemoteMirror>,
    pull_guard: Arc<Mutex<()>>,
}

impl Synchronizer {
    pub fn new(store: HabitStore, remote: Arc<dyn RemoteMirror>) -> Self {
        Self {
            store,
            remote,
            pull_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteMirror> {
        &self.remote
    }

    /// Fetch the remote list and merge it into the store.
    ///
    /// Never returns an error: remote failures leave the store untouched and
    /// come back as [`PullOutcome::Unreachable`].
    pub async fn pull_merge(&self) -> PullOutcome {
        let Ok(_guard) = self.pull_guard.try_lock() else {
            tracing::info!("Pull already in progress, skipping overlapping request");
            return PullOutcome::AlreadyRunning;
        };

        let records = match self.remote.list().await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Pull-merge skipped, remote unavailable: {error}");
                return PullOutcome::Unreachable(error.to_string());
            }
        };

        match self.merge_records(&records).await {
            Ok(report) => {
                tracing::info!(
                    fetched = report.fetched,
                    inserted = report.inserted,
                    updated = report.updated,
                    "Pull-merge finished"
                );
                PullOutcome::Merged(report)
            }
            Err(error) => {
                tracing::warn!("Pull-merge aborted by local store error: {error}");
                PullOutcome::Failed(error.to_string())
            }
        }
    }

    async fn merge_records(&self, records: &[RemoteHabit]) -> Result<PullReport> {
        let mut report = PullReport {
            fetched: records.len(),
            ..PullReport::default()
        };

        for record in records {
            let incoming = record.to_local();

            // Records without a remote id cannot be correlated across runs
            if record.id == 0 {
                self.store.insert(&incoming).await?;
                report.inserted += 1;
                continue;
            }

            match self
                .store
                .upsert_from_remote(record.id, &incoming, merge_into)
                .await?
            {
                Upsert::Inserted(_) => report.inserted += 1,
                Upsert::Updated(_) => report.updated += 1,
                Upsert::Unchanged(_) => report.unchanged += 1,
            }
        }

        Ok(report)
    }

    /// Create one stored habit on the remote.
    ///
    /// Returns whether the remote accepted it. The habit itself is never
    /// modified; only its sync state is recorded.
    ///
    /// Holds the pull guard until the remote id is linked, so a pull can never
    /// see the new remote record before its link exists.
    pub async fn push_one(&self, habit: &Habit) -> bool {
        if !habit.is_stored() {
            tracing::warn!(name = %habit.name, "Refusing to push a habit that is not stored");
            return false;
        }

        let _guard = self.pull_guard.lock().await;

        match self.store.link(habit.id).await {
            Ok(Some(link)) if link.state == SyncState::Synced && link.remote_id.is_some() => {
                tracing::debug!(id = habit.id, "Habit already mirrored, push skipped");
                return true;
            }
            Ok(_) => {}
            Err(error) => tracing::warn!(id = habit.id, "Could not read sync state: {error}"),
        }

        self.record(habit.id, None, SyncState::Pending).await;

        let (remote_id, state) = match self.remote.create(&habit.to_remote(None)).await {
            Ok(Some(created)) => ((created.id != 0).then_some(created.id), SyncState::Synced),
            Ok(None) => (None, SyncState::Failed),
            Err(error) => {
                tracing::warn!(id = habit.id, "Push failed, keeping habit local: {error}");
                (None, SyncState::Failed)
            }
        };

        self.record(habit.id, remote_id, state).await;
        state == SyncState::Synced
    }

    async fn record(&self, local_id: i64, remote_id: Option<i64>, state: SyncState) {
        if let Err(error) = self.store.record_sync(local_id, remote_id, state).await {
            tracing::warn!(local_id, %state, "Could not record sync state: {error}");
        }
    }

    /// Count habits per sync state.
    pub async fn summary(&self) -> Result<SyncSummary> {
        let habits = self.store.list().await?;
        let links = self.store.links().await?;

        let mut summary = SyncSummary::default();
        for habit in &habits {
            match links.iter().find(|link| link.local_id == habit.id) {
                Some(link) => match link.state {
                    SyncState::Synced => summary.synced += 1,
                    SyncState::Pending => summary.pending += 1,
                    SyncState::Failed => summary.failed += 1,
                },
                None => summary.local_only += 1,
            }
        }
        Ok(summary)
    }
}

/// Apply a remote copy onto the linked local habit.
///
/// Remote fields win, except the streak which never goes down.
fn merge_into(current: &Habit, incoming: &Habit) -> Habit {
    Habit {
        id: current.id,
        streak: current.streak.max(incoming.streak),
        ..incoming.clone()
    }
}
