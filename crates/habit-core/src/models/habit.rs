//! Habit model

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Locally assigned habit identifier. `0` means "not stored yet".
pub type HabitId = i64;

/// Id carried by a habit that has not been inserted into the store.
pub const UNASSIGNED_ID: HabitId = 0;

/// A tracked habit as stored on the device.
///
/// The serialized shape is the snapshot file format, so field names are
/// camelCase and there is no version field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(default)]
    pub id: HabitId,
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
}

impl Habit {
    /// Create an unsaved, incomplete habit with a zero streak
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            streak: 0,
            is_completed: false,
            image_ref: None,
            buddy_name: None,
            buddy_phone: None,
        }
    }

    /// Whether the store has assigned an id to this habit
    pub const fn is_stored(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Apply a completion transition.
    ///
    /// Incomplete to complete bumps the streak by exactly one. Complete to
    /// incomplete keeps the streak. Setting the current state again changes
    /// nothing.
    #[must_use]
    pub fn with_completion(&self, completed: bool) -> Self {
        let mut next = self.clone();
        if completed && !self.is_completed {
            next.streak = self.streak.saturating_add(1);
        }
        next.is_completed = completed;
        next
    }

    /// Flip the completion flag, see [`Habit::with_completion`]
    #[must_use]
    pub fn toggled(&self) -> Self {
        self.with_completion(!self.is_completed)
    }
}

/// A habit submission coming from the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub description: String,
    pub image_ref: Option<String>,
    pub buddy_name: Option<String>,
    pub buddy_phone: Option<String>,
}

impl NewHabit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    #[must_use]
    pub fn with_buddy(mut self, name: impl Into<String>, phone: Option<String>) -> Self {
        self.buddy_name = Some(name.into());
        self.buddy_phone = phone;
        self
    }

    /// Validate and normalize the submission into an unsaved [`Habit`].
    ///
    /// Nothing is written anywhere; callers can rely on a validation error
    /// meaning no state changed.
    pub fn validate(self) -> Result<Habit> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Habit name cannot be empty".to_string()));
        }

        let buddy_name = normalize_text_option(self.buddy_name);
        let buddy_phone = normalize_text_option(self.buddy_phone);
        if let Some(phone) = buddy_phone.as_deref() {
            if !is_phone_number(phone) {
                return Err(Error::Validation(format!(
                    "Buddy phone '{phone}' is not a phone number"
                )));
            }
        }

        let mut description = self.description.trim().to_string();
        if let Some(buddy) = buddy_name.as_deref() {
            description = describe_with_buddy(&description, buddy);
        }

        Ok(Habit {
            image_ref: normalize_text_option(self.image_ref),
            buddy_name,
            buddy_phone,
            ..Habit::new(name, description)
        })
    }
}

/// Append the buddy line to a description unless it already names the buddy.
fn describe_with_buddy(description: &str, buddy: &str) -> String {
    if description.contains(buddy) {
        description.to_string()
    } else if description.is_empty() {
        format!("Buddy: {buddy}")
    } else {
        format!("{description}\n\nBuddy: {buddy}")
    }
}

fn is_phone_number(value: &str) -> bool {
    let re = Regex::new(r"^\+?[0-9][0-9 ()\-]{2,}$").expect("Invalid regex");
    re.is_match(value)
}
