//! In-memory record storage for the mirror.

use std::collections::BTreeMap;
use std::path::Path;

use habit_core::RemoteHabit;

#[derive(Debug)]
pub struct MirrorStore {
    next_id: i64,
    records: BTreeMap<i64, RemoteHabit>,
}

impl Default for MirrorStore {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

impl MirrorStore {
    /// Start from existing records. Positive ids are kept, others are assigned.
    pub fn from_records(records: Vec<RemoteHabit>) -> Self {
        let mut store = Self::default();
        let (with_id, without_id): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|record| record.id > 0);

        for record in with_id {
            store.next_id = store.next_id.max(record.id.saturating_add(1));
            store.records.insert(
                record.id,
                RemoteHabit {
                    synced: true,
                    ..record
                },
            );
        }
        for record in without_id {
            store.create(record);
        }
        store
    }

    pub fn load_seed(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read seed file {}: {}", path.display(), error))?;
        let records = serde_json::from_str::<Vec<RemoteHabit>>(&raw)
            .map_err(|error| format!("Failed to parse seed file {}: {}", path.display(), error))?;
        if let Some(record) = records.iter().find(|record| record.id == i64::MAX) {
            return Err(format!(
                "Seed record {:?} in {} leaves no room for new ids",
                record.name,
                path.display()
            ));
        }
        Ok(Self::from_records(records))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn list(&self) -> Vec<RemoteHabit> {
        self.records.values().cloned().collect()
    }

    pub fn get(&self, id: i64) -> Option<RemoteHabit> {
        self.records.get(&id).cloned()
    }

    /// Store a new record under a fresh id, ignoring any id it carries.
    pub fn create(&mut self, record: RemoteHabit) -> RemoteHabit {
        let id = self.next_id;
        self.next_id += 1;

        let created = RemoteHabit {
            id,
            synced: true,
            ..record
        };
        self.records.insert(id, created.clone());
        created
    }

    pub fn update(&mut self, id: i64, record: RemoteHabit) -> Option<RemoteHabit> {
        let slot = self.records.get_mut(&id)?;
        *slot = RemoteHabit {
            id,
            synced: true,
            ..record
        };
        Some(slot.clone())
    }

    pub fn delete(&mut self, id: i64) -> bool {
        self.records.remove(&id).is_some()
    }
}
