//! Data models for Habit

mod habit;
mod remote_habit;
mod remote_link;

pub use habit::{Habit, HabitId, NewHabit, UNASSIGNED_ID};
pub use remote_habit::RemoteHabit;
pub use remote_link::{RemoteLink, SyncState};
