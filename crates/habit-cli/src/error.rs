use std::io;

use habit_core::remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] habit_core::Error),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    /// An intent finished in the error state
    #[error("{0}")]
    Rejected(String),
    #[error(
        "Sync is not configured. Run `habit config set-remote <URL>` or set HABIT_REMOTE_URL."
    )]
    SyncNotConfigured,
}
