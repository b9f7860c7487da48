use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use habit_core::config::{resolve_remote_config, RemoteConfig};
use habit_core::models::{RemoteLink, SyncState};
use habit_core::remote::HttpRemoteMirror;
use habit_core::snapshot::SnapshotCodec;
use habit_core::sync::Synchronizer;
use habit_core::util::normalize_text_option;
use habit_core::{Habit, HabitCoordinator, HabitStore, UiState};
use serde::Serialize;

use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

/// Where the CLI keeps its files and which remote it talks to.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    /// Remote base URL from the environment, wins over the stored config
    pub remote_url: Option<String>,
}

impl CliContext {
    /// Resolve paths from flags, then `HABIT_*` environment variables, then defaults.
    pub fn from_args(db_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| env_path("HABIT_DATA_DIR"))
            .unwrap_or_else(default_data_dir);
        let db_path = db_path
            .or_else(|| env_path("HABIT_DB_PATH"))
            .unwrap_or_else(|| data_dir.join("habits.db"));

        Self {
            db_path,
            data_dir,
            config_path: default_config_path(),
            remote_url: normalize_text_option(env::var("HABIT_REMOTE_URL").ok()),
        }
    }

    pub fn load_config(&self) -> Result<CliConfig, CliError> {
        CliConfig::load_from_path(&self.config_path).map_err(CliError::Config)
    }

    /// Effective remote mirror config, `None` when working offline only.
    pub fn remote_config(&self) -> Result<Option<RemoteConfig>, CliError> {
        let stored = self.load_config()?.remote;
        resolve_remote_config(self.remote_url.clone(), stored).map_err(CliError::Config)
    }

    pub async fn open_store(&self) -> Result<HabitStore, CliError> {
        Ok(HabitStore::open_path(&self.db_path).await?)
    }

    pub async fn open_coordinator(&self) -> Result<HabitCoordinator, CliError> {
        let store = self.open_store().await?;
        let sync = match self.remote_config()? {
            Some(config) => {
                tracing::debug!("Remote mirror at {}", config.collection_url());
                let remote = HttpRemoteMirror::new(config)?;
                Some(Synchronizer::new(store.clone(), Arc::new(remote)))
            }
            None => None,
        };
        Ok(HabitCoordinator::new(
            store,
            SnapshotCodec::in_dir(&self.data_dir),
            sync,
        ))
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    normalize_text_option(env::var(key).ok()).map(PathBuf::from)
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("habit")
}

/// Print a finished intent, turning the error state into a [`CliError`].
pub fn report(state: UiState) -> Result<UiState, CliError> {
    match &state {
        UiState::Error(message) => Err(CliError::Rejected(message.clone())),
        UiState::Success(message) => {
            println!("{message}");
            Ok(state)
        }
        UiState::Loading => Ok(state),
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HabitListItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub streak: u32,
    pub completed: bool,
    pub buddy_name: Option<String>,
    pub buddy_phone: Option<String>,
    pub image_ref: Option<String>,
    pub sync_state: Option<String>,
}

pub fn habit_to_list_item(habit: &Habit, links: &[RemoteLink]) -> HabitListItem {
    HabitListItem {
        id: habit.id,
        name: habit.name.clone(),
        description: habit.description.clone(),
        streak: habit.streak,
        completed: habit.is_completed,
        buddy_name: habit.buddy_name.clone(),
        buddy_phone: habit.buddy_phone.clone(),
        image_ref: habit.image_ref.clone(),
        sync_state: sync_state_of(habit, links).map(|state| state.to_string()),
    }
}

fn sync_state_of(habit: &Habit, links: &[RemoteLink]) -> Option<SyncState> {
    links
        .iter()
        .find(|link| link.local_id == habit.id)
        .map(|link| link.state)
}

pub fn format_habit_lines(habits: &[Habit], links: &[RemoteLink]) -> Vec<String> {
    habits
        .iter()
        .map(|habit| {
            let mark = if habit.is_completed { "x" } else { " " };
            let name = name_preview(&habit.name, 32);
            let streak = format_streak(habit.streak);
            match sync_state_of(habit, links) {
                Some(SyncState::Synced) | None => {
                    format!("{:>4}  [{mark}] {name:<32}  {streak}", habit.id)
                }
                Some(state) => {
                    format!("{:>4}  [{mark}] {name:<32}  {streak:<10}  ({state})", habit.id)
                }
            }
        })
        .collect()
}

pub fn format_streak(streak: u32) -> String {
    if streak == 1 {
        "1 day".to_string()
    } else {
        format!("{streak} days")
    }
}

pub fn name_preview(name: &str, max_chars: usize) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}
