//! habit-core - Core library for Habit
//!
//! This crate contains the habit model, the local libSQL store, the remote
//! mirror client and synchronizer, snapshot backups and the presentation
//! coordinator shared by every Habit interface.

pub mod config;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod models;
pub mod reminder;
pub mod remote;
pub mod services;
pub mod snapshot;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Habit, HabitId, NewHabit, RemoteHabit};
pub use coordinator::{HabitCoordinator, UiState};
pub use services::HabitStore;
