use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use habit_core::RemoteHabit;
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::MirrorStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: Arc<RwLock<MirrorStore>>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: MirrorStore) -> Self {
        Self {
            config,
            store: Arc::new(RwLock::new(store)),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    let collection = format!("/{}", state.config.resource);
    let item = format!("{collection}/{{id}}");

    Router::new()
        .route("/healthz", get(healthz))
        .route(&collection, get(list_records).post(create_record))
        .route(
            &item,
            get(get_record).put(update_record).delete(delete_record),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    records: usize,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        records: state.store.read().await.record_count(),
    })
}

async fn list_records(State(state): State<AppState>) -> Json<Vec<RemoteHabit>> {
    Json(state.store.read().await.list())
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RemoteHabit>, AppError> {
    state
        .store
        .read()
        .await
        .get(id)
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

async fn create_record(
    State(state): State<AppState>,
    Json(record): Json<RemoteHabit>,
) -> Result<(StatusCode, Json<RemoteHabit>), AppError> {
    let record = validate_record(record)?;
    let created = state.store.write().await.create(record);
    tracing::info!(id = created.id, "Created record");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(record): Json<RemoteHabit>,
) -> Result<Json<RemoteHabit>, AppError> {
    let record = validate_record(record)?;
    let updated = state
        .store
        .write()
        .await
        .update(id, record)
        .ok_or(AppError::NotFound(id))?;
    tracing::info!(id, "Updated record");
    Ok(Json(updated))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.store.write().await.delete(id) {
        return Err(AppError::NotFound(id));
    }
    tracing::info!(id, "Deleted record");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_record(record: RemoteHabit) -> Result<RemoteHabit, AppError> {
    let name = record.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    Ok(RemoteHabit {
        name: name.to_string(),
        ..record
    })
}
