//! JSON snapshot backups of the habit list.
//!
//! The file is a plain JSON array of habits (camelCase keys, no envelope or
//! version). Loading is tolerant: a missing or unreadable file is "no
//! snapshot", never a crash.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::Habit;

/// File name of the snapshot inside the data directory
pub const SNAPSHOT_FILE_NAME: &str = "habits_backup.json";

/// Reads and writes the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotCodec {
    path: PathBuf,
}

impl SnapshotCodec {
    /// Codec for the well-known snapshot file inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::at_path(data_dir.as_ref().join(SNAPSHOT_FILE_NAME))
    }

    /// Codec for an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Serialize the list, overwriting any previous snapshot.
    ///
    /// Returns the number of habits written.
    pub fn save(&self, habits: &[Habit]) -> Result<usize> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(habits)?;
        std::fs::write(&self.path, json)?;
        tracing::info!(count = habits.len(), path = %self.path.display(), "Saved snapshot");
        Ok(habits.len())
    }

    /// Read the snapshot, `None` when it is absent or cannot be decoded.
    pub fn load(&self) -> Option<Vec<Habit>> {
        if !self.exists() {
            return None;
        }
        match self.try_load() {
            Ok(habits) => Some(habits),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable snapshot: {error}");
                None
            }
        }
    }

    /// Read the snapshot, reporting why it could not be used.
    pub fn try_load(&self) -> Result<Vec<Habit>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|error| {
            Error::Codec(format!("cannot read {}: {error}", self.path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|error| {
            Error::Codec(format!("cannot decode {}: {error}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Habit> {
        vec![
            Habit {
                id: 3,
                streak: 4,
                is_completed: true,
                ..Habit::new("Read", "20 pages")
            },
            Habit {
                id: 9,
                buddy_name: Some("Sam".to_string()),
                ..Habit::new("Run", "Buddy: Sam")
            },
        ]
    }

    #[test]
    fn save_then_load_returns_same_list() {
        let tmp = tempfile::tempdir().unwrap();
        let codec = SnapshotCodec::in_dir(tmp.path().join("data"));

        assert!(!codec.exists());
        assert_eq!(codec.save(&sample()).unwrap(), 2);
        assert!(codec.exists());
        assert_eq!(codec.load(), Some(sample()));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let codec = SnapshotCodec::in_dir(tmp.path());

        codec.save(&sample()).unwrap();
        codec.save(&[]).unwrap();
        assert_eq!(codec.load(), Some(Vec::new()));
    }

    #[test]
    fn missing_snapshot_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let codec = SnapshotCodec::in_dir(tmp.path());
        assert_eq!(codec.load(), None);
        assert!(matches!(codec.try_load(), Err(Error::Codec(_))));
    }

    #[test]
    fn corrupt_snapshot_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let codec = SnapshotCodec::in_dir(tmp.path());
        std::fs::write(codec.path(), "{not json").unwrap();

        assert!(codec.exists());
        assert_eq!(codec.load(), None);
        assert!(matches!(codec.try_load(), Err(Error::Codec(_))));
    }

    #[test]
    fn reads_camel_case_records_with_missing_optionals() {
        let tmp = tempfile::tempdir().unwrap();
        let codec = SnapshotCodec::in_dir(tmp.path());
        std::fs::write(
            codec.path(),
            r#"[{"id": 1, "name": "Walk", "description": "", "streak": 2, "isCompleted": true}]"#,
        )
        .unwrap();

        let habits = codec.load().unwrap();
        assert_eq!(
            habits,
            vec![Habit {
                id: 1,
                streak: 2,
                is_completed: true,
                ..Habit::new("Walk", "")
            }]
        );
    }
}
