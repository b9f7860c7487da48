//! Remote mirror record

use serde::{Deserialize, Serialize};

use super::habit::{Habit, UNASSIGNED_ID};

/// A habit as the remote mirror stores it.
///
/// `id` is the remote identifier and has nothing to do with the local one;
/// the mapping between the two lives in [`super::RemoteLink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteHabit {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub buddy_name: Option<String>,
    #[serde(default)]
    pub buddy_phone: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

impl RemoteHabit {
    /// Copy the record into local shape. The `synced` flag is dropped and the
    /// id is left unassigned so the store picks a local one.
    #[must_use]
    pub fn to_local(&self) -> Habit {
        Habit {
            id: UNASSIGNED_ID,
            name: self.name.clone(),
            description: self.description.clone(),
            streak: self.streak,
            is_completed: self.is_completed,
            image_ref: self.image_ref.clone(),
            buddy_name: self.buddy_name.clone(),
            buddy_phone: self.buddy_phone.clone(),
        }
    }
}

impl Habit {
    /// Copy the habit into remote shape for a create call.
    ///
    /// `remote_id` is the mirror's id when the habit is already linked, `0`
    /// otherwise (the mirror assigns one on create).
    #[must_use]
    pub fn to_remote(&self, remote_id: Option<i64>) -> RemoteHabit {
        RemoteHabit {
            id: remote_id.unwrap_or_default(),
            name: self.name.clone(),
            description: self.description.clone(),
            streak: self.streak,
            is_completed: self.is_completed,
            image_ref: self.image_ref.clone(),
            buddy_name: self.buddy_name.clone(),
            buddy_phone: self.buddy_phone.clone(),
            synced: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn to_local_drops_remote_identity() {
        let remote = RemoteHabit {
            id: 1001,
            name: "Server habit".to_string(),
            description: "From the server".to_string(),
            streak: 7,
            is_completed: true,
            image_ref: None,
            buddy_name: Some("Ana".to_string()),
            buddy_phone: None,
            synced: true,
        };

        let local = remote.to_local();
        assert_eq!(local.id, UNASSIGNED_ID);
        assert_eq!(local.name, "Server habit");
        assert_eq!(local.streak, 7);
        assert!(local.is_completed);
        assert_eq!(local.buddy_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn to_remote_never_sends_local_id() {
        let habit = Habit {
            id: 42,
            ..Habit::new("Walk", "")
        };

        assert_eq!(habit.to_remote(None).id, 0);
        assert_eq!(habit.to_remote(Some(9)).id, 9);
        assert!(!habit.to_remote(None).synced);
    }

    #[test]
    fn remote_json_tolerates_missing_optional_fields() {
        let remote: RemoteHabit =
            serde_json::from_str(r#"{"id": 3, "name": "Sleep early"}"#).unwrap();
        assert_eq!(remote.id, 3);
        assert_eq!(remote.description, "");
        assert!(!remote.synced);
    }
}
