pub mod add;
pub mod backup;
pub mod common;
pub mod complete;
pub mod config;
pub mod delete;
pub mod list;
pub mod remind;
pub mod sync;
