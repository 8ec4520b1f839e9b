//! Console server: loads settings from env, ensures entity tables exist,
//! mounts common, entity, utils, and docs routes.

use axum::Router;
use bot_console::{
    apply_migrations, common_routes, entity_routes, AppState, CloudClient, EntityRegistry,
    Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bot_console=info".parse()?))
        .init();

    let settings = Settings::from_env();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let registry = EntityRegistry::builtin();
    apply_migrations(&pool, &registry).await?;

    let state = AppState {
        pool,
        registry: Arc::new(registry),
        cloud: Arc::new(CloudClient::new(settings.cloud.clone())),
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", entity_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
