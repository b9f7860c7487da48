use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "habit")]
#[command(about = "Track daily habits and streaks from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Directory holding the backup snapshot
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new habit
    #[command(alias = "new")]
    Add(AddArgs),
    /// List habits with their streaks
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit as done
    #[command(alias = "done")]
    Check {
        /// Habit ID
        id: i64,
    },
    /// Mark a habit as not done
    Uncheck {
        /// Habit ID
        id: i64,
    },
    /// Flip a habit between done and not done
    Toggle {
        /// Habit ID
        id: i64,
    },
    /// Delete a habit
    #[command(alias = "rm")]
    Delete {
        /// Habit ID
        id: i64,
    },
    /// Save every habit to the backup snapshot
    Backup,
    /// Replace every habit with the backup snapshot
    Restore,
    /// Pull habits from the remote mirror
    Sync {
        /// Show per-habit sync state counts instead of syncing
        #[arg(long)]
        status: bool,
    },
    /// Suggest a habit that is still pending
    Remind,
    /// Configure the remote mirror
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    /// Habit name
    pub name: String,
    /// Longer description
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Image URI to attach
    #[arg(long, value_name = "URI")]
    pub image: Option<String>,
    /// Accountability buddy name
    #[arg(long, value_name = "NAME")]
    pub buddy_name: Option<String>,
    /// Accountability buddy phone
    #[arg(long, value_name = "PHONE", requires = "buddy_name")]
    pub buddy_phone: Option<String>,
    /// Keep the habit local even when a remote is configured
    #[arg(long)]
    pub no_push: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Store the remote mirror location
    SetRemote {
        /// Base URL, e.g. <https://api.example.com>
        url: String,
        /// Collection path below the base URL
        #[arg(long, value_name = "NAME")]
        resource: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
    },
    /// Forget the stored remote mirror
    ClearRemote,
    /// Print the effective configuration
    Show,
}
