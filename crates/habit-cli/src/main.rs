//! Habit CLI - track daily habits and streaks from the terminal
//!
//! Works fully offline against a local database; a remote mirror can be
//! configured for pushing new habits and pulling existing ones.

mod cli;
mod commands;
mod config;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::backup::{run_backup, run_restore};
use crate::commands::common::CliContext;
use crate::commands::complete::{run_completion, Completion};
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::remind::run_remind;
use crate::commands::sync::{run_sync, run_sync_status};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("habit=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let context = CliContext::from_args(cli.db_path, cli.data_dir);

    match cli.command {
        Some(Commands::Add(args)) => {
            run_add(args, &context).await?;
        }
        Some(Commands::List { json }) => run_list(json, &context).await?,
        Some(Commands::Check { id }) => {
            run_completion(id, Completion::Check, &context).await?;
        }
        Some(Commands::Uncheck { id }) => {
            run_completion(id, Completion::Uncheck, &context).await?;
        }
        Some(Commands::Toggle { id }) => {
            run_completion(id, Completion::Toggle, &context).await?;
        }
        Some(Commands::Delete { id }) => {
            run_delete(id, &context).await?;
        }
        Some(Commands::Backup) => {
            run_backup(&context).await?;
        }
        Some(Commands::Restore) => {
            run_restore(&context).await?;
        }
        Some(Commands::Sync { status: true }) => {
            run_sync_status(&context).await?;
        }
        Some(Commands::Sync { status: false }) => {
            run_sync(&context).await?;
        }
        Some(Commands::Remind) => {
            run_remind(&context).await?;
        }
        Some(Commands::Config { command }) => run_config(command, &context)?,
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
