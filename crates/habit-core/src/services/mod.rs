//! Services shared by every Habit client.

mod store;

pub use store::{HabitList, HabitStore, Upsert};
