use habit_core::{NewHabit, UiState};

use crate::cli::AddArgs;
use crate::commands::common::{report, CliContext};
use crate::error::CliError;

pub async fn run_add(args: AddArgs, context: &CliContext) -> Result<UiState, CliError> {
    let mut submission = NewHabit::new(args.name).with_description(args.description);
    if let Some(image) = args.image {
        submission = submission.with_image(image);
    }
    if let Some(buddy_name) = args.buddy_name {
        submission = submission.with_buddy(buddy_name, args.buddy_phone);
    }

    let coordinator = context.open_coordinator().await?;
    let push = !args.no_push && coordinator.synchronizer().is_some();
    report(coordinator.add_habit(submission, push).await)
}
