//! In-process [`RemoteMirror`] for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{RemoteError, RemoteMirror, RemoteResult};
use crate::models::RemoteHabit;

/// First id handed out by [`FakeRemote::create`]
pub const FIRST_REMOTE_ID: i64 = 5000;

#[derive(Default)]
pub struct FakeRemote {
    pub records: Mutex<Vec<RemoteHabit>>,
    pub offline: AtomicBool,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub list_delay: Option<Duration>,
    pub create_delay: Option<Duration>,
}

impl FakeRemote {
    pub fn with_records(records: Vec<RemoteHabit>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        let remote = Self::default();
        remote.set_offline(true);
        remote
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Server {
                status: 503,
                message: "offline".to_string(),
            });
        }
        Ok(())
    }
}

/// A remote record as a server would hand it out
pub fn remote_record(id: i64, name: &str, streak: u32) -> RemoteHabit {
    RemoteHabit {
        id,
        name: name.to_string(),
        description: format!("{name} from server"),
        streak,
        is_completed: false,
        image_ref: None,
        buddy_name: None,
        buddy_phone: None,
        synced: true,
    }
}

#[async_trait]
impl RemoteMirror for FakeRemote {
    async fn list(&self) -> RemoteResult<Vec<RemoteHabit>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get(&self, id: i64) -> RemoteResult<Option<RemoteHabit>> {
        self.check_online()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn create(&self, habit: &RemoteHabit) -> RemoteResult<Option<RemoteHabit>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        let mut records = self.records.lock().unwrap();
        let created = RemoteHabit {
            id: FIRST_REMOTE_ID + i64::try_from(records.len()).unwrap(),
            synced: true,
            ..habit.clone()
        };
        records.push(created.clone());
        Ok(Some(created))
    }

    async fn update(&self, habit: &RemoteHabit) -> RemoteResult<bool> {
        self.check_online()?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|record| record.id == habit.id) {
            Some(record) => {
                *record = habit.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> RemoteResult<bool> {
        self.check_online()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }
}
