//! Reminder text for the habit list.
//!
//! Picks what to nudge the user about; delivering the notification is left
//! to the caller.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Habit;

const ENCOURAGEMENTS: [&str; 3] = [
    "Great work!",
    "You're doing great! Keep it up!",
    "Amazing! Don't stop now!",
];

/// What a reminder should say
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reminder {
    /// A habit still waiting to be completed
    Habit(Habit),
    /// Nothing left to do; carries an encouragement line
    AllDone(&'static str),
}

impl Reminder {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Habit(_) => "Habit reminder",
            Self::AllDone(_) => "All habits done",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::Habit(habit) if habit.description.is_empty() => {
                format!("Don't forget: {}", habit.name)
            }
            Self::Habit(habit) => format!("Don't forget: {}\n\n{}", habit.name, habit.description),
            Self::AllDone(message) => (*message).to_string(),
        }
    }
}

/// Choose a random incomplete habit, or an encouragement when none is left.
pub fn pick_reminder<R: Rng + ?Sized>(habits: &[Habit], rng: &mut R) -> Reminder {
    let pending: Vec<&Habit> = habits.iter().filter(|habit| !habit.is_completed).collect();

    match pending.choose(rng) {
        Some(habit) => Reminder::Habit((*habit).clone()),
        None => Reminder::AllDone(ENCOURAGEMENTS.choose(rng).copied().unwrap_or("Great work!")),
    }
}
