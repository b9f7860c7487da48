use habit_core::{HabitId, UiState};

use crate::commands::common::{report, CliContext};
use crate::error::CliError;

pub async fn run_delete(id: HabitId, context: &CliContext) -> Result<UiState, CliError> {
    let coordinator = context.open_coordinator().await?;
    report(coordinator.delete_habit(id).await)
}
