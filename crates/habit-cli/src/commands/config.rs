use habit_core::config::RemoteConfig;

use crate::cli::ConfigCommands;
use crate::commands::common::CliContext;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, context: &CliContext) -> Result<(), CliError> {
    match command {
        ConfigCommands::SetRemote {
            url,
            resource,
            timeout_secs,
        } => {
            let remote = build_remote_config(url, resource, timeout_secs)?;
            run_set_remote(remote, context)
        }
        ConfigCommands::ClearRemote => run_clear_remote(context),
        ConfigCommands::Show => {
            for line in describe_config(context)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

pub fn build_remote_config(
    url: String,
    resource: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<RemoteConfig, CliError> {
    let mut remote = RemoteConfig::new(url).map_err(CliError::Config)?;
    if let Some(resource) = resource {
        remote = remote.with_resource(resource).map_err(CliError::Config)?;
    }
    if let Some(timeout_secs) = timeout_secs {
        remote = remote
            .with_timeout_secs(timeout_secs)
            .normalized()
            .map_err(CliError::Config)?;
    }
    Ok(remote)
}

pub fn run_set_remote(remote: RemoteConfig, context: &CliContext) -> Result<(), CliError> {
    let mut config = context.load_config()?;
    let collection_url = remote.collection_url();
    config.remote = Some(remote);
    config
        .save_to_path(&context.config_path)
        .map_err(CliError::Config)?;

    println!("Remote mirror set to {collection_url}");
    println!("Config: {}", context.config_path.display());
    Ok(())
}

pub fn run_clear_remote(context: &CliContext) -> Result<(), CliError> {
    let mut config = context.load_config()?;
    if config.remote.take().is_none() {
        println!("No remote mirror configured");
        return Ok(());
    }
    config
        .save_to_path(&context.config_path)
        .map_err(CliError::Config)?;

    println!("Remote mirror cleared");
    Ok(())
}

pub fn describe_config(context: &CliContext) -> Result<Vec<String>, CliError> {
    let mut lines = vec![
        format!("database: {}", context.db_path.display()),
        format!("data dir: {}", context.data_dir.display()),
        format!("config:   {}", context.config_path.display()),
    ];

    match context.remote_config()? {
        Some(remote) => {
            let source = if context.remote_url.is_some() {
                "HABIT_REMOTE_URL"
            } else {
                "config file"
            };
            lines.push(format!("remote:   {} (from {source})", remote.collection_url()));
            lines.push(format!("timeout:  {}s", remote.timeout_secs));
        }
        None => lines.push("remote:   not configured (offline only)".to_string()),
    }
    Ok(lines)
}
