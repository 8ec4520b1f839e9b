//! Utility endpoints over the cloud adapter. These never fail outward:
//! translation degrades to the input text, chat reports a failure result.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

fn default_source() -> String {
    "zh".into()
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target: String,
    #[serde(default = "default_source")]
    pub source: String,
}

pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Json<Value> {
    let text = state
        .cloud
        .translate_text(&req.text, &req.target, &req.source)
        .await;
    Json(json!({ "text": text }))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<Value> {
    Json(state.cloud.chat(&req.content).await)
}
