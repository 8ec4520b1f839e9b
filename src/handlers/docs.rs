//! Serve the operation-doc registry.

use crate::docs::operation_docs;
use crate::state::AppState;
use axum::{extract::State, Json};

pub async fn list_docs(State(state): State<AppState>) -> Json<serde_json::Value> {
    let docs = operation_docs(&state.registry);
    Json(serde_json::json!({ "data": docs }))
}
