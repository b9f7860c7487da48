//! Remote mirror configuration.
//!
//! Provides the `RemoteConfig` shared by the CLI and tests to reach the REST
//! mirror. Everything here is optional: without a remote the app works fully
//! offline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};

const DEFAULT_RESOURCE: &str = "habits";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the remote mirror lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://api.example.com`
    pub base_url: String,
    /// Collection path below the base URL
    #[serde(default = "default_resource")]
    pub resource: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_resource() -> String {
    DEFAULT_RESOURCE.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl RemoteConfig {
    /// Build a config for the given base URL with the default resource and timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, String> {
        Self {
            base_url: base_url.into(),
            resource: default_resource(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
        .normalized()
    }

    /// Use a different collection path
    pub fn with_resource(mut self, resource: impl Into<String>) -> Result<Self, String> {
        self.resource = resource.into();
        self.normalized()
    }

    /// Use a different request timeout
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate fields, trimming whitespace and slashes.
    pub fn normalized(self) -> Result<Self, String> {
        let base_url = normalize_text_option(Some(self.base_url))
            .ok_or_else(|| "remote base URL must not be empty".to_string())?;
        if !is_http_url(&base_url) {
            return Err(format!(
                "remote base URL '{base_url}' must include http:// or https://"
            ));
        }

        let resource = self.resource.trim().trim_matches('/').to_string();
        if resource.is_empty() {
            return Err("remote resource must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("remote timeout must be at least one second".to_string());
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource,
            timeout_secs: self.timeout_secs,
        })
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// URL of the whole collection
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    /// URL of a single record
    pub fn item_url(&self, id: i64) -> String {
        format!("{}/{id}", self.collection_url())
    }
}

/// Pick the effective remote config.
///
/// An explicit URL (environment or flag) wins over the stored config and
/// inherits its resource and timeout.
pub fn resolve_remote_config(
    explicit_url: Option<String>,
    stored: Option<RemoteConfig>,
) -> Result<Option<RemoteConfig>, String> {
    match (normalize_text_option(explicit_url), stored) {
        (Some(url), Some(stored)) => RemoteConfig {
            base_url: url,
            ..stored
        }
        .normalized()
        .map(Some),
        (Some(url), None) => RemoteConfig::new(url).map(Some),
        (None, Some(stored)) => stored.normalized().map(Some),
        (None, None) => Ok(None),
    }
}
