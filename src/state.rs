//! Shared application state for all routes.

use crate::cloud::CloudClient;
use crate::schema::EntityRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<EntityRegistry>,
    pub cloud: Arc<CloudClient>,
}
