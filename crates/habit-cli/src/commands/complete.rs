use habit_core::{HabitId, UiState};

use crate::commands::common::{report, CliContext};
use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Check,
    Uncheck,
    Toggle,
}

pub async fn run_completion(
    id: HabitId,
    completion: Completion,
    context: &CliContext,
) -> Result<UiState, CliError> {
    let coordinator = context.open_coordinator().await?;
    let state = match completion {
        Completion::Check => coordinator.set_completed(id, true).await,
        Completion::Uncheck => coordinator.set_completed(id, false).await,
        Completion::Toggle => coordinator.toggle(id).await,
    };
    report(state)
}
