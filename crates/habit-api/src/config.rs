use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Collection path segment, e.g. `habits` for `/habits`
    pub resource: String,
    /// JSON array of records loaded at startup
    pub seed_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "HABIT_API_BIND_ADDR", "127.0.0.1:8787");

        let resource = value_or_default(&lookup, "HABIT_API_RESOURCE", "habits")
            .trim_matches('/')
            .to_string();
        if resource.is_empty() || resource.contains('/') || resource == "healthz" {
            return Err(ConfigError::Invalid(
                "HABIT_API_RESOURCE must be a single path segment other than 'healthz'"
                    .to_string(),
            ));
        }

        let seed_path = optional_trimmed(&lookup, "HABIT_API_SEED_FILE").map(PathBuf::from);

        Ok(Self {
            bind_addr,
            resource,
            seed_path,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
