//! Habit repository implementation

use crate::error::{Error, Result};
use crate::models::{Habit, HabitId, RemoteLink, SyncState};
use libsql::{Connection, Value};

const HABIT_COLUMNS: &str =
    "id, name, description, streak, is_completed, image_ref, buddy_name, buddy_phone";

/// Trait for habit storage operations (async)
#[allow(async_fn_in_trait)]
pub trait HabitRepository {
    /// Insert a habit and return the id the database assigned
    async fn insert(&self, habit: &Habit) -> Result<HabitId>;

    /// Get a habit by ID
    async fn get(&self, id: HabitId) -> Result<Option<Habit>>;

    /// List every habit in insertion order
    async fn list_all(&self) -> Result<Vec<Habit>>;

    /// Overwrite a habit matched by id. Returns `false` when no row matched.
    async fn update(&self, habit: &Habit) -> Result<bool>;

    /// Permanently delete a habit. Returns `false` when no row matched.
    async fn delete(&self, id: HabitId) -> Result<bool>;

    /// Delete every habit, returning how many rows were removed
    async fn delete_all(&self) -> Result<u64>;

    /// Create or replace the remote link of a habit
    async fn set_link(
        &self,
        local_id: HabitId,
        remote_id: Option<i64>,
        state: SyncState,
    ) -> Result<()>;

    /// Get the remote link of a habit
    async fn get_link(&self, local_id: HabitId) -> Result<Option<RemoteLink>>;

    /// Find the local habit linked to a remote id
    async fn find_local_by_remote(&self, remote_id: i64) -> Result<Option<HabitId>>;

    /// List all remote links
    async fn list_links(&self) -> Result<Vec<RemoteLink>>;
}

/// libSQL implementation of `HabitRepository`
pub struct LibSqlHabitRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlHabitRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a habit from a database row
    fn parse_habit(row: &libsql::Row) -> Result<Habit> {
        let streak: i64 = row.get(3)?;
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            streak: u32::try_from(streak).unwrap_or_default(),
            is_completed: row.get::<i64>(4)? != 0,
            image_ref: optional_text(row.get_value(5)?),
            buddy_name: optional_text(row.get_value(6)?),
            buddy_phone: optional_text(row.get_value(7)?),
        })
    }

    fn parse_link(row: &libsql::Row) -> Result<RemoteLink> {
        let state: String = row.get(2)?;
        Ok(RemoteLink {
            local_id: row.get(0)?,
            remote_id: match row.get_value(1)? {
                Value::Integer(id) => Some(id),
                _ => None,
            },
            state: state.parse().map_err(Error::Database)?,
            updated_at: row.get(3)?,
        })
    }
}

impl HabitRepository for LibSqlHabitRepository<'_> {
    async fn insert(&self, habit: &Habit) -> Result<HabitId> {
        let now = chrono::Utc::now().timestamp_millis();

        self.conn
            .execute(
                "INSERT INTO habits (name, description, streak, is_completed, image_ref, buddy_name, buddy_phone, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                libsql::params![
                    habit.name.as_str(),
                    habit.description.as_str(),
                    i64::from(habit.streak),
                    i64::from(habit.is_completed),
                    text_param(habit.image_ref.as_deref()),
                    text_param(habit.buddy_name.as_deref()),
                    text_param(habit.buddy_phone.as_deref()),
                    now,
                    now
                ],
            )
            .await?;

        Ok(self.conn.last_insert_rowid())
    }

    async fn get(&self, id: HabitId) -> Result<Option<Habit>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                libsql::params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_habit(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Habit>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {HABIT_COLUMNS} FROM habits ORDER BY id ASC"),
                (),
            )
            .await?;

        let mut habits = Vec::new();
        while let Some(row) = rows.next().await? {
            habits.push(Self::parse_habit(&row)?);
        }
        Ok(habits)
    }

    async fn update(&self, habit: &Habit) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE habits
                 SET name = ?1, description = ?2, streak = ?3, is_completed = ?4,
                     image_ref = ?5, buddy_name = ?6, buddy_phone = ?7, updated_at = ?8
                 WHERE id = ?9",
                libsql::params![
                    habit.name.as_str(),
                    habit.description.as_str(),
                    i64::from(habit.streak),
                    i64::from(habit.is_completed),
                    text_param(habit.image_ref.as_deref()),
                    text_param(habit.buddy_name.as_deref()),
                    text_param(habit.buddy_phone.as_deref()),
                    now,
                    habit.id
                ],
            )
            .await?;

        Ok(rows > 0)
    }

    async fn delete(&self, id: HabitId) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", libsql::params![id])
            .await?;
        Ok(rows > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        Ok(self.conn.execute("DELETE FROM habits", ()).await?)
    }

    async fn set_link(
        &self,
        local_id: HabitId,
        remote_id: Option<i64>,
        state: SyncState,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let remote_id = remote_id.map_or(Value::Null, Value::Integer);

        // A failed push must not forget a remote id learned earlier
        self.conn
            .execute(
                "INSERT INTO remote_links (local_id, remote_id, state, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(local_id) DO UPDATE SET
                     remote_id = COALESCE(excluded.remote_id, remote_links.remote_id),
                     state = excluded.state,
                     updated_at = excluded.updated_at",
                libsql::params![local_id, remote_id, state.as_str(), now],
            )
            .await?;
        Ok(())
    }

    async fn get_link(&self, local_id: HabitId) -> Result<Option<RemoteLink>> {
        let mut rows = self
            .conn
            .query(
                "SELECT local_id, remote_id, state, updated_at FROM remote_links WHERE local_id = ?1",
                libsql::params![local_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_link(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_local_by_remote(&self, remote_id: i64) -> Result<Option<HabitId>> {
        let mut rows = self
            .conn
            .query(
                "SELECT local_id FROM remote_links WHERE remote_id = ?1",
                libsql::params![remote_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn list_links(&self) -> Result<Vec<RemoteLink>> {
        let mut rows = self
            .conn
            .query(
                "SELECT local_id, remote_id, state, updated_at FROM remote_links ORDER BY local_id ASC",
                (),
            )
            .await?;

        let mut links = Vec::new();
        while let Some(row) = rows.next().await? {
            links.push(Self::parse_link(&row)?);
        }
        Ok(links)
    }
}

fn text_param(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn optional_text(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample(name: &str) -> Habit {
        Habit {
            buddy_name: Some("Kim".to_string()),
            buddy_phone: Some("+44 20 7946 0000".to_string()),
            ..Habit::new(name, "daily")
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_insert_assigns_ids_and_get() {
        let db = setup().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        let first = repo.insert(&sample("Read")).await.unwrap();
        let second = repo.insert(&sample("Run")).await.unwrap();
        assert!(first > 0);
        assert_ne!(first, second);

        let fetched = repo.get(first).await.unwrap().unwrap();
        assert_eq!(fetched, Habit { id: first, ..sample("Read") });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_all_in_insertion_order() {
        let db = setup().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        for name in ["One", "Two", "Three"] {
            repo.insert(&Habit::new(name, "")).await.unwrap();
        }

        let names = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|habit| habit.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["One", "Two", "Three"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_missing_is_silent() {
        let db = setup().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        let ghost = Habit {
            id: 99,
            ..Habit::new("Ghost", "")
        };
        assert!(!repo.update(&ghost).await.unwrap());
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_and_delete() {
        let db = setup().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        let id = repo.insert(&Habit::new("Walk", "")).await.unwrap();
        let mut habit = repo.get(id).await.unwrap().unwrap();
        habit = habit.with_completion(true);
        assert!(repo.update(&habit).await.unwrap());

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.streak, 1);
        assert!(stored.is_completed);

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.get(id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_links_follow_habit_lifecycle() {
        let db = setup().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        let id = repo.insert(&Habit::new("Yoga", "")).await.unwrap();
        repo.set_link(id, Some(501), SyncState::Synced).await.unwrap();
        assert_eq!(repo.find_local_by_remote(501).await.unwrap(), Some(id));

        // A failed attempt keeps the known remote id
        repo.set_link(id, None, SyncState::Failed).await.unwrap();
        let link = repo.get_link(id).await.unwrap().unwrap();
        assert_eq!(link.remote_id, Some(501));
        assert_eq!(link.state, SyncState::Failed);

        // Deleting the habit cascades to its link
        repo.delete(id).await.unwrap();
        assert!(repo.list_links().await.unwrap().is_empty());
        assert_eq!(repo.find_local_by_remote(501).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_all() {
        let db = setup().await;
        let repo = LibSqlHabitRepository::new(db.connection());

        repo.insert(&Habit::new("A", "")).await.unwrap();
        repo.insert(&Habit::new("B", "")).await.unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
