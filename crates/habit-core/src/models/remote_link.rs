//! Local to remote identity mapping

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::habit::HabitId;

/// Per-record synchronization state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Created locally, never pushed
    Pending,
    /// Mirrored remotely under a known remote id
    Synced,
    /// Last push attempt failed; not retried automatically
    Failed,
}

impl SyncState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "synced" => Ok(Self::Synced),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown sync state '{other}'")),
        }
    }
}

/// Persisted link between a local habit and its remote counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLink {
    /// Local habit id
    pub local_id: HabitId,
    /// Remote id, known once a push or pull succeeded
    pub remote_id: Option<i64>,
    /// Current state
    pub state: SyncState,
    /// Last change (unix ms)
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_state_roundtrips_through_text() {
        for state in [SyncState::Pending, SyncState::Synced, SyncState::Failed] {
            assert_eq!(state.as_str().parse::<SyncState>().unwrap(), state);
        }
        assert!("lost".parse::<SyncState>().is_err());
    }
}
