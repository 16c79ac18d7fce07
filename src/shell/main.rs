use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use attendance_tracker::shared::infrastructure::store::SharedStore;
use attendance_tracker::shared::infrastructure::store::in_memory::InMemoryStore;
use attendance_tracker::shared::infrastructure::store::sqlite::SqliteStore;
use attendance_tracker::shell::config::{Config, StoreBackend};
use attendance_tracker::shell::graphql::{build_schema, routes};
use attendance_tracker::shell::http::router;
use attendance_tracker::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let store: SharedStore = match &config.store {
        StoreBackend::InMemory => {
            tracing::warn!("using the in memory store, data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Sqlite { path } => {
            tracing::info!(path = %path, "opening sqlite store");
            Arc::new(SqliteStore::open(path)?)
        }
    };

    let state = AppState::new(store);
    let schema = build_schema(state.clone());

    let app = router(state)
        .merge(routes(schema))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    tracing::info!("GraphQL endpoint: http://{}/gql", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
