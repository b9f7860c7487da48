use habit_core::reminder::{pick_reminder, Reminder};

use crate::commands::common::CliContext;
use crate::error::CliError;

pub async fn run_remind(context: &CliContext) -> Result<Reminder, CliError> {
    let store = context.open_store().await?;
    let reminder = pick_reminder(&store.snapshot(), &mut rand::thread_rng());

    println!("{}", reminder.title());
    println!("{}", reminder.body());
    Ok(reminder)
}
