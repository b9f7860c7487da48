//! Shared habit store used across clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::db::{Database, HabitRepository, LibSqlHabitRepository};
use crate::models::{Habit, HabitId, RemoteLink, SyncState};
use crate::Result;

/// Full-list snapshot published after every mutation
pub type HabitList = Arc<[Habit]>;

/// What [`HabitStore::upsert_from_remote`] did with a remote copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted(HabitId),
    Updated(HabitId),
    Unchanged(HabitId),
}

/// Thread-safe entity store for habits.
///
/// Every mutation runs under one lock and publishes the complete list before
/// the lock is released, so subscribers observe mutations in order and an
/// inserted habit is visible with its id before the next write starts.
#[derive(Clone)]
pub struct HabitStore {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
    habits: Arc<watch::Sender<HabitList>>,
}

impl HabitStore {
    /// Open a store at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Self::open_database_with_recovery(&db_path).await?;
        Self::from_database(db, Some(db_path)).await
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Self::from_database(db, None).await
    }

    async fn from_database(db: Database, db_path: Option<PathBuf>) -> Result<Self> {
        let initial = LibSqlHabitRepository::new(db.connection()).list_all().await?;
        let (habits, _) = watch::channel(HabitList::from(initial));
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path,
            habits: Arc::new(habits),
        })
    }

    async fn open_database_with_recovery(db_path: &Path) -> Result<Database> {
        match Database::open(db_path).await {
            Ok(db) => Ok(db),
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Local habit database at {} is unreadable: {}. Moving it aside and starting fresh.",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_files(db_path)?;
                Database::open(db_path).await
            }
            Err(error) => Err(error),
        }
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        let message = error.to_string().to_ascii_lowercase();
        message.contains("file is not a database") || message.contains("disk image is malformed")
    }

    fn quarantine_corrupted_db_files(db_path: &Path) -> Result<()> {
        if db_path.exists() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let base_name = db_path
                .file_name()
                .map_or_else(|| "habits.db".into(), |name| name.to_string_lossy());
            let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted local DB file from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }

        let Some(parent) = db_path.parent() else {
            return Ok(());
        };
        let Some(base_name) = db_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(());
        };
        let sidecar_prefix = format!("{base_name}-");

        for entry in std::fs::read_dir(parent)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(&sidecar_prefix) {
                let path = entry.path();
                std::fs::remove_file(&path)?;
                tracing::warn!("Removed stale database sidecar {}", path.display());
            }
        }

        Ok(())
    }

    /// Path of the backing database file, `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Subscribe to full-list snapshots.
    ///
    /// The receiver starts out holding the current list; each later mutation
    /// replaces it. Slow subscribers only ever see the latest list.
    pub fn subscribe(&self) -> watch::Receiver<HabitList> {
        self.habits.subscribe()
    }

    /// The most recently published list.
    pub fn snapshot(&self) -> HabitList {
        self.habits.borrow().clone()
    }

    async fn publish(&self, repo: &LibSqlHabitRepository<'_>) -> Result<()> {
        let habits = repo.list_all().await?;
        tracing::debug!(count = habits.len(), "Publishing habit list");
        self.habits.send_replace(HabitList::from(habits));
        Ok(())
    }

    /// List habits straight from the database.
    pub async fn list(&self) -> Result<Vec<Habit>> {
        let db = self.db.lock().await;
        LibSqlHabitRepository::new(db.connection()).list_all().await
    }

    /// Fetch a habit by id.
    pub async fn get(&self, id: HabitId) -> Result<Option<Habit>> {
        let db = self.db.lock().await;
        LibSqlHabitRepository::new(db.connection()).get(id).await
    }

    /// Insert a habit and return its assigned id.
    pub async fn insert(&self, habit: &Habit) -> Result<HabitId> {
        let db = self.db.lock().await;
        let repo = LibSqlHabitRepository::new(db.connection());
        let id = repo.insert(habit).await?;
        tracing::debug!(id, name = %habit.name, "Inserted habit");
        self.publish(&repo).await?;
        Ok(id)
    }

    /// Overwrite a habit by id. Absent ids are ignored and return `false`.
    pub async fn update(&self, habit: &Habit) -> Result<bool> {
        let db = self.db.lock().await;
        let repo = LibSqlHabitRepository::new(db.connection());
        let updated = repo.update(habit).await?;
        if updated {
            self.publish(&repo).await?;
        } else {
            tracing::debug!(id = habit.id, "Update skipped, habit not found");
        }
        Ok(updated)
    }

    /// Read, transform and write a habit under a single lock.
    ///
    /// Returns the stored result, or `None` when the id is absent. Nothing is
    /// written or published when `change` returns an equal habit.
    pub async fn modify(
        &self,
        id: HabitId,
        change: impl FnOnce(&Habit) -> Habit,
    ) -> Result<Option<Habit>> {
        let db = self.db.lock().await;
        let repo = LibSqlHabitRepository::new(db.connection());
        let Some(current) = repo.get(id).await? else {
            return Ok(None);
        };

        let next = Habit {
            id,
            ..change(&current)
        };
        if next != current {
            repo.update(&next).await?;
            tracing::debug!(id, "Modified habit");
            self.publish(&repo).await?;
        }
        Ok(Some(next))
    }

    /// Store a remote copy, merging it into the habit already linked to
    /// `remote_id` or inserting and linking a new one.
    pub async fn upsert_from_remote(
        &self,
        remote_id: i64,
        incoming: &Habit,
        merge: impl FnOnce(&Habit, &Habit) -> Habit,
    ) -> Result<Upsert> {
        let db = self.db.lock().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        let current = match repo.find_local_by_remote(remote_id).await? {
            Some(local_id) => repo.get(local_id).await?,
            None => None,
        };

        let outcome = match current {
            Some(current) => {
                let merged = Habit {
                    id: current.id,
                    ..merge(&current, incoming)
                };
                if merged == current {
                    return Ok(Upsert::Unchanged(current.id));
                }
                repo.update(&merged).await?;
                Upsert::Updated(current.id)
            }
            None => {
                let id = repo.insert(incoming).await?;
                repo.set_link(id, Some(remote_id), SyncState::Synced).await?;
                Upsert::Inserted(id)
            }
        };

        tracing::debug!(remote_id, ?outcome, "Stored remote habit");
        self.publish(&repo).await?;
        Ok(outcome)
    }

    /// Permanently delete a habit.
    pub async fn delete(&self, id: HabitId) -> Result<bool> {
        let db = self.db.lock().await;
        let repo = LibSqlHabitRepository::new(db.connection());
        let deleted = repo.delete(id).await?;
        if deleted {
            tracing::debug!(id, "Deleted habit");
            self.publish(&repo).await?;
        }
        Ok(deleted)
    }

    /// Delete every habit.
    pub async fn delete_all(&self) -> Result<u64> {
        let db = self.db.lock().await;
        let repo = LibSqlHabitRepository::new(db.connection());
        let removed = repo.delete_all().await?;
        self.publish(&repo).await?;
        Ok(removed)
    }

    /// Replace the whole list in one transaction.
    ///
    /// Records are inserted in the given order with fresh ids. Subscribers
    /// never observe the intermediate empty list.
    pub async fn replace_all(&self, habits: &[Habit]) -> Result<Vec<HabitId>> {
        let db = self.db.lock().await;
        let conn = db.connection();
        let repo = LibSqlHabitRepository::new(conn);

        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            repo.delete_all().await?;
            let mut ids = Vec::with_capacity(habits.len());
            for habit in habits {
                ids.push(repo.insert(habit).await?);
            }
            Ok::<_, crate::Error>(ids)
        }
        .await;

        let ids = match result {
            Ok(ids) => ids,
            Err(error) => {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(error);
            }
        };
        if let Err(error) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(error.into());
        }

        tracing::info!(count = ids.len(), "Replaced habit list");
        self.publish(&repo).await?;
        Ok(ids)
    }

    /// Record the outcome of a push for a habit.
    pub async fn record_sync(
        &self,
        local_id: HabitId,
        remote_id: Option<i64>,
        state: SyncState,
    ) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlHabitRepository::new(db.connection())
            .set_link(local_id, remote_id, state)
            .await
    }

    /// Remote link of a habit, if it was ever pushed or pulled.
    pub async fn link(&self, local_id: HabitId) -> Result<Option<RemoteLink>> {
        let db = self.db.lock().await;
        LibSqlHabitRepository::new(db.connection())
            .get_link(local_id)
            .await
    }

    /// Local habit mirroring the given remote id.
    pub async fn find_local_by_remote(&self, remote_id: i64) -> Result<Option<HabitId>> {
        let db = self.db.lock().await;
        LibSqlHabitRepository::new(db.connection())
            .find_local_by_remote(remote_id)
            .await
    }

    /// Every remote link.
    pub async fn links(&self) -> Result<Vec<RemoteLink>> {
        let db = self.db.lock().await;
        LibSqlHabitRepository::new(db.connection())
            .list_links()
            .await
    }
}
