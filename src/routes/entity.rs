//! Entity CRUD routes. Parameterized paths: handlers resolve the entity by
//! path segment against the registry. The static /im-types/platforms route
//! takes precedence over the /:path_segment/:id capture.

use crate::handlers::cloud::{chat, translate};
use crate::handlers::docs::list_docs;
use crate::handlers::entity::{create, destroy, im_platforms, list, update};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/docs", get(list_docs))
        .route("/utils/translate", post(translate))
        .route("/utils/chat", post(chat))
        .route("/im-types/platforms", get(im_platforms))
        .route("/:path_segment", get(list).post(create))
        .route("/:path_segment/:id", axum::routing::patch(update).delete(destroy))
        .with_state(state)
}
