use habit_core::sync::SyncSummary;
use habit_core::UiState;

use crate::commands::common::{report, CliContext};
use crate::error::CliError;

pub async fn run_sync(context: &CliContext) -> Result<UiState, CliError> {
    let coordinator = context.open_coordinator().await?;
    if coordinator.synchronizer().is_none() {
        return Err(CliError::SyncNotConfigured);
    }
    report(coordinator.sync().await)
}

pub async fn run_sync_status(context: &CliContext) -> Result<SyncSummary, CliError> {
    let coordinator = context.open_coordinator().await?;
    let Some(sync) = coordinator.synchronizer() else {
        return Err(CliError::SyncNotConfigured);
    };

    let summary = sync.summary().await?;
    println!("{}", format_sync_summary(&summary));
    Ok(summary)
}

pub fn format_sync_summary(summary: &SyncSummary) -> String {
    format!(
        "synced: {}  pending: {}  failed: {}  local only: {}",
        summary.synced, summary.pending, summary.failed, summary.local_only
    )
}
