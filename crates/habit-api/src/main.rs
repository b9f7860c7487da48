mod config;
mod error;
mod routes;
mod store;

use std::sync::Arc;

use config::AppConfig;
use routes::{app_router, AppState};
use store::MirrorStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only load .env in development
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("habit_api=info".parse().expect("valid directive")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!("Starting habit-api with config: {:?}", config);

    let store = match config.seed_path.as_deref() {
        Some(path) => {
            let store = MirrorStore::load_seed(path)?;
            tracing::info!(
                "Seeded {} records from {}",
                store.record_count(),
                path.display()
            );
            store
        }
        None => MirrorStore::default(),
    };

    let bind_addr = config.bind_addr.clone();
    let resource = config.resource.clone();
    let router = app_router(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("habit-api serving /{} on {}", resource, bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
