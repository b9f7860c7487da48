//! REST client for the remote habit mirror.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::RemoteConfig;
use crate::models::RemoteHabit;
use crate::util::compact_text;

#[cfg(test)]
pub(crate) mod fake;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Remote returned {status}: {message}")]
    Server { status: u16, message: String },
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// The remote mirror as the synchronizer sees it.
///
/// Rejections (non-2xx) on single-record operations come back as `None` or
/// `false`. Only transport faults and a failed listing are errors.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Fetch every remote record
    async fn list(&self) -> RemoteResult<Vec<RemoteHabit>>;

    /// Fetch one record, `None` when the mirror does not have it
    async fn get(&self, id: i64) -> RemoteResult<Option<RemoteHabit>>;

    /// Create a record. Returns the stored record (with its remote id) on success.
    async fn create(&self, habit: &RemoteHabit) -> RemoteResult<Option<RemoteHabit>>;

    /// Replace the record with `habit.id`
    async fn update(&self, habit: &RemoteHabit) -> RemoteResult<bool>;

    /// Delete a record
    async fn delete(&self, id: i64) -> RemoteResult<bool>;
}

/// `reqwest` implementation of [`RemoteMirror`].
#[derive(Clone)]
pub struct HttpRemoteMirror {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl HttpRemoteMirror {
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let config = config
            .normalized()
            .map_err(RemoteError::InvalidConfiguration)?;
        let client = build_client(config.timeout())?;
        Ok(Self { config, client })
    }

    pub const fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

fn build_client(timeout: Duration) -> RemoteResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

#[async_trait]
impl RemoteMirror for HttpRemoteMirror {
    async fn list(&self) -> RemoteResult<Vec<RemoteHabit>> {
        let response = self
            .client
            .get(self.config.collection_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        Ok(response.json::<Vec<RemoteHabit>>().await?)
    }

    async fn get(&self, id: i64) -> RemoteResult<Option<RemoteHabit>> {
        let response = self
            .client
            .get(self.config.item_url(id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            log_rejection("get", response).await;
            return Ok(None);
        }

        Ok(Some(response.json::<RemoteHabit>().await?))
    }

    async fn create(&self, habit: &RemoteHabit) -> RemoteResult<Option<RemoteHabit>> {
        let response = self
            .client
            .post(self.config.collection_url())
            .json(habit)
            .send()
            .await?;

        if !response.status().is_success() {
            log_rejection("create", response).await;
            return Ok(None);
        }

        Ok(Some(response.json::<RemoteHabit>().await?))
    }

    async fn update(&self, habit: &RemoteHabit) -> RemoteResult<bool> {
        let response = self
            .client
            .put(self.config.item_url(habit.id))
            .json(habit)
            .send()
            .await?;

        let accepted = response.status().is_success();
        if !accepted {
            log_rejection("update", response).await;
        }
        Ok(accepted)
    }

    async fn delete(&self, id: i64) -> RemoteResult<bool> {
        let response = self.client.delete(self.config.item_url(id)).send().await?;

        let accepted = response.status().is_success();
        if !accepted {
            log_rejection("delete", response).await;
        }
        Ok(accepted)
    }
}

async fn log_rejection(operation: &str, response: reqwest::Response) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        operation,
        status = status.as_u16(),
        "Remote mirror rejected request: {}",
        parse_api_error(status, &body)
    );
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
