use crate::commands::common::{format_habit_lines, habit_to_list_item, CliContext, HabitListItem};
use crate::error::CliError;

pub async fn run_list(as_json: bool, context: &CliContext) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let habits = store.list().await?;
    let links = store.links().await?;

    if as_json {
        let json_items = habits
            .iter()
            .map(|habit| habit_to_list_item(habit, &links))
            .collect::<Vec<HabitListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if habits.is_empty() {
        println!("No habits yet. Add one with `habit add <NAME>`.");
        return Ok(());
    }

    for line in format_habit_lines(&habits, &links) {
        println!("{line}");
    }
    Ok(())
}
