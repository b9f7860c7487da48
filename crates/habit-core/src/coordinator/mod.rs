//! Presentation coordinator.
//!
//! Turns user intents (check, add, delete, backup, restore, sync) into store,
//! snapshot and synchronizer calls, and reports the outcome as a [`UiState`].
//! The coordinator never edits the habit list itself; its view is the list
//! the store publishes after every write.

use tokio::sync::watch;

use crate::models::{Habit, HabitId, NewHabit};
use crate::services::{HabitList, HabitStore};
use crate::snapshot::SnapshotCodec;
use crate::sync::{PullOutcome, Synchronizer};

/// Status shown to the user after an intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Loading,
    Success(String),
    Error(String),
}

impl UiState {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The status text, empty while loading
    pub fn message(&self) -> &str {
        match self {
            Self::Loading => "",
            Self::Success(message) | Self::Error(message) => message,
        }
    }
}

pub struct HabitCoordinator {
    store: HabitStore,
    snapshot: SnapshotCodec,
    sync: Option<Synchronizer>,
    habits: watch::Receiver<HabitList>,
    state: watch::Sender<UiState>,
}

impl HabitCoordinator {
    /// `sync` is `None` when no remote mirror is configured.
    pub fn new(store: HabitStore, snapshot: SnapshotCodec, sync: Option<Synchronizer>) -> Self {
        let habits = store.subscribe();
        let (state, _) = watch::channel(UiState::Loading);
        Self {
            store,
            snapshot,
            sync,
            habits,
            state,
        }
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    /// Current view list
    pub fn habits(&self) -> HabitList {
        self.habits.borrow().clone()
    }

    pub fn subscribe_habits(&self) -> watch::Receiver<HabitList> {
        self.habits.clone()
    }

    pub const fn synchronizer(&self) -> Option<&Synchronizer> {
        self.sync.as_ref()
    }

    fn emit(&self, state: UiState) -> UiState {
        match &state {
            UiState::Loading => tracing::debug!("Loading"),
            UiState::Success(message) => tracing::info!("{message}"),
            UiState::Error(message) => tracing::debug!("{message}"),
        }
        self.state.send_replace(state.clone());
        state
    }

    fn success(&self, message: impl Into<String>) -> UiState {
        self.emit(UiState::Success(message.into()))
    }

    fn error(&self, message: impl Into<String>) -> UiState {
        self.emit(UiState::Error(message.into()))
    }

    /// Flip a habit between complete and incomplete.
    pub async fn toggle(&self, id: HabitId) -> UiState {
        self.apply_completion(id, Habit::toggled).await
    }

    /// Mark a habit complete or incomplete. Repeating the current state is a no-op.
    pub async fn set_completed(&self, id: HabitId, completed: bool) -> UiState {
        self.apply_completion(id, |habit| habit.with_completion(completed))
            .await
    }

    async fn apply_completion(&self, id: HabitId, transition: impl FnOnce(&Habit) -> Habit) -> UiState {
        let next = match self.store.modify(id, transition).await {
            Ok(Some(habit)) => habit,
            Ok(None) => return self.error(crate::Error::NotFound(id.to_string()).to_string()),
            Err(error) => return self.error(format!("Failed to update habit: {error}")),
        };

        if next.is_completed {
            self.success(format!("{} completed! Streak: {} days", next.name, next.streak))
        } else {
            self.success(format!("{} not completed", next.name))
        }
    }

    /// Validate and store a new habit, optionally pushing it to the remote.
    ///
    /// Validation failures leave the store untouched.
    pub async fn add_habit(&self, submission: NewHabit, push: bool) -> UiState {
        let habit = match submission.validate() {
            Ok(habit) => habit,
            Err(error) => return self.error(error.to_string()),
        };

        let id = match self.store.insert(&habit).await {
            Ok(id) => id,
            Err(error) => return self.error(format!("Failed to add habit: {error}")),
        };

        if !push {
            return self.success("Habit added");
        }

        let pushed = match &self.sync {
            Some(sync) => sync.push_one(&Habit { id, ..habit }).await,
            None => false,
        };
        if pushed {
            self.success("Habit added and synced")
        } else {
            self.success("Habit added locally (offline)")
        }
    }

    pub async fn delete_habit(&self, id: HabitId) -> UiState {
        match self.store.delete(id).await {
            Ok(true) => self.success("Habit deleted"),
            Ok(false) => self.error(crate::Error::NotFound(id.to_string()).to_string()),
            Err(error) => self.error(format!("Failed to delete habit: {error}")),
        }
    }

    /// Write the current view list to the snapshot file.
    pub fn create_backup(&self) -> UiState {
        let habits = self.habits();
        match self.snapshot.save(&habits) {
            Ok(count) => self.success(format!("Backup created: saved {count} habits")),
            Err(error) => self.error(format!("Backup failed: {error}")),
        }
    }

    /// Replace every habit with the snapshot contents.
    pub async fn restore_backup(&self) -> UiState {
        if !self.snapshot.exists() {
            return self.error("Backup not found");
        }
        let Some(habits) = self.snapshot.load() else {
            return self.error("Restore failed");
        };

        match self.store.replace_all(&habits).await {
            Ok(ids) => self.success(format!("Restored {} habits", ids.len())),
            Err(error) => self.error(format!("Restore failed: {error}")),
        }
    }

    /// Pull the remote list into the store.
    ///
    /// An unreachable remote is reported as a success: local data stays usable.
    pub async fn sync(&self) -> UiState {
        let Some(sync) = &self.sync else {
            return self.error("Sync is not configured");
        };

        self.emit(UiState::Loading);
        match sync.pull_merge().await {
            PullOutcome::Merged(report) => self.success(format!(
                "Sync complete ({} new, {} updated)",
                report.inserted, report.updated
            )),
            PullOutcome::AlreadyRunning => self.success("Sync already in progress"),
            PullOutcome::Unreachable(_) => self.success("Remote unreachable, working offline"),
            PullOutcome::Failed(error) => self.error(format!("Sync failed: {error}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{remote_record, FakeRemote};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Fixture {
        coordinator: HabitCoordinator,
        store: HabitStore,
        _data_dir: tempfile::TempDir,
    }

    async fn fixture(remote: Option<FakeRemote>) -> Fixture {
        let data_dir = tempfile::tempdir().unwrap();
        let store = HabitStore::open_in_memory().await.unwrap();
        let sync = remote.map(|remote| Synchronizer::new(store.clone(), Arc::new(remote)));
        let coordinator =
            HabitCoordinator::new(store.clone(), SnapshotCodec::in_dir(data_dir.path()), sync);
        Fixture {
            coordinator,
            store,
            _data_dir: data_dir,
        }
    }

    fn success(message: &str) -> UiState {
        UiState::Success(message.to_string())
    }

    async fn add(fixture: &Fixture, name: &str) -> HabitId {
        fixture
            .coordinator
            .add_habit(NewHabit::new(name), false)
            .await;
        fixture
            .coordinator
            .habits()
            .iter()
            .find(|habit| habit.name == name)
            .unwrap()
            .id
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn starts_loading_with_current_list() {
        let fx = fixture(None).await;
        assert_eq!(fx.coordinator.state(), UiState::Loading);
        assert!(fx.coordinator.habits().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn toggle_bumps_streak_only_when_completing() {
        let fx = fixture(None).await;
        let id = add(&fx, "Read").await;

        assert_eq!(
            fx.coordinator.toggle(id).await,
            success("Read completed! Streak: 1 days")
        );
        assert_eq!(fx.coordinator.toggle(id).await, success("Read not completed"));

        let habit = fx.store.get(id).await.unwrap().unwrap();
        assert_eq!(habit.streak, 1);
        assert!(!habit.is_completed);

        assert_eq!(
            fx.coordinator.toggle(id).await,
            success("Read completed! Streak: 2 days")
        );
        assert_eq!(fx.coordinator.habits()[0].streak, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_toggles_keep_both_transitions() {
        let data_dir = tempfile::tempdir().unwrap();
        let store = HabitStore::open_path(data_dir.path().join("habits.db"))
            .await
            .unwrap();
        let coordinator =
            HabitCoordinator::new(store.clone(), SnapshotCodec::in_dir(data_dir.path()), None);

        for _ in 0..25 {
            let id = store.insert(&Habit::new("Floss", "")).await.unwrap();
            tokio::join!(coordinator.toggle(id), coordinator.toggle(id));

            let habit = store.get(id).await.unwrap().unwrap();
            assert!(!habit.is_completed);
            assert_eq!(habit.streak, 1);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn set_completed_twice_counts_once() {
        let fx = fixture(None).await;
        let id = add(&fx, "Run").await;

        fx.coordinator.set_completed(id, true).await;
        fx.coordinator.set_completed(id, true).await;
        assert_eq!(fx.store.get(id).await.unwrap().unwrap().streak, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn toggle_unknown_habit_is_an_error() {
        let fx = fixture(None).await;
        assert!(fx.coordinator.toggle(42).await.is_error());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_name_is_rejected_without_mutation() {
        let fx = fixture(None).await;
        let mut habits = fx.coordinator.subscribe_habits();
        habits.borrow_and_update();

        let state = fx.coordinator.add_habit(NewHabit::new("   "), true).await;

        assert!(state.is_error());
        assert!(state.message().contains("Invalid input"));
        assert!(!habits.has_changed().unwrap());
        assert!(fx.store.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_with_buddy_folds_buddy_into_description() {
        let fx = fixture(None).await;
        let submission = NewHabit::new("Swim")
            .with_description("Pool at 7")
            .with_buddy("Sam", Some("+1 555 0100".to_string()));

        assert_eq!(fx.coordinator.add_habit(submission, false).await, success("Habit added"));
        let habit = fx.coordinator.habits()[0].clone();
        assert_eq!(habit.description, "Pool at 7\n\nBuddy: Sam");
        assert_eq!(habit.buddy_phone.as_deref(), Some("+1 555 0100"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_and_push_reports_sync_result() {
        let fx = fixture(Some(FakeRemote::default())).await;
        assert_eq!(
            fx.coordinator.add_habit(NewHabit::new("Online"), true).await,
            success("Habit added and synced")
        );

        let offline = fixture(Some(FakeRemote::offline())).await;
        assert_eq!(
            offline.coordinator.add_habit(NewHabit::new("Offline"), true).await,
            success("Habit added locally (offline)")
        );
        let kept = offline.store.list().await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Offline");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn push_without_remote_stays_local() {
        let fx = fixture(None).await;
        assert_eq!(
            fx.coordinator.add_habit(NewHabit::new("Solo"), true).await,
            success("Habit added locally (offline)")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_removes_habit() {
        let fx = fixture(None).await;
        let id = add(&fx, "Gone").await;

        assert_eq!(fx.coordinator.delete_habit(id).await, success("Habit deleted"));
        assert!(fx.coordinator.habits().is_empty());
        assert!(fx.coordinator.delete_habit(id).await.is_error());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn backup_then_restore_brings_habits_back() {
        let fx = fixture(None).await;
        let read = add(&fx, "Read").await;
        add(&fx, "Run").await;
        fx.coordinator.toggle(read).await;

        assert_eq!(
            fx.coordinator.create_backup(),
            success("Backup created: saved 2 habits")
        );
        fx.store.delete_all().await.unwrap();
        add(&fx, "Temporary").await;

        assert_eq!(fx.coordinator.restore_backup().await, success("Restored 2 habits"));
        let restored = fx.coordinator.habits();
        assert_eq!(
            restored.iter().map(|habit| habit.name.as_str()).collect::<Vec<_>>(),
            vec!["Read", "Run"]
        );
        assert_eq!(restored[0].streak, 1);
        assert!(restored[0].is_completed);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restoring_empty_snapshot_clears_everything() {
        let fx = fixture(None).await;
        fx.coordinator.create_backup();
        add(&fx, "A").await;
        add(&fx, "B").await;

        assert_eq!(fx.coordinator.restore_backup().await, success("Restored 0 habits"));
        assert!(fx.store.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restore_reports_missing_and_corrupt_snapshots() {
        let data_dir = tempfile::tempdir().unwrap();
        let store = HabitStore::open_in_memory().await.unwrap();
        let snapshot = SnapshotCodec::in_dir(data_dir.path());
        let coordinator = HabitCoordinator::new(store.clone(), snapshot.clone(), None);
        store.insert(&Habit::new("Keep", "")).await.unwrap();

        assert_eq!(
            coordinator.restore_backup().await,
            UiState::Error("Backup not found".to_string())
        );

        std::fs::write(snapshot.path(), "[{\"name\": ").unwrap();
        assert_eq!(
            coordinator.restore_backup().await,
            UiState::Error("Restore failed".to_string())
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_reports_each_outcome() {
        let unconfigured = fixture(None).await;
        assert_eq!(
            unconfigured.coordinator.sync().await,
            UiState::Error("Sync is not configured".to_string())
        );

        let fx = fixture(Some(FakeRemote::with_records(vec![
            remote_record(1, "A", 0),
            remote_record(2, "B", 3),
        ])))
        .await;
        let states = fx.coordinator.subscribe_state();
        assert_eq!(fx.coordinator.sync().await, success("Sync complete (2 new, 0 updated)"));
        assert!(states.has_changed().unwrap());
        assert_eq!(fx.coordinator.sync().await, success("Sync complete (0 new, 0 updated)"));
        assert_eq!(fx.coordinator.habits().len(), 2);

        let offline = fixture(Some(FakeRemote::offline())).await;
        assert_eq!(
            offline.coordinator.sync().await,
            success("Remote unreachable, working offline")
        );
    }
}
