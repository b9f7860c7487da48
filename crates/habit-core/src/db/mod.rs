//! Database layer for Habit

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{HabitRepository, LibSqlHabitRepository};
