use habit_core::UiState;

use crate::commands::common::{report, CliContext};
use crate::error::CliError;

pub async fn run_backup(context: &CliContext) -> Result<UiState, CliError> {
    let coordinator = context.open_coordinator().await?;
    report(coordinator.create_backup())
}

pub async fn run_restore(context: &CliContext) -> Result<UiState, CliError> {
    let coordinator = context.open_coordinator().await?;
    report(coordinator.restore_backup().await)
}
