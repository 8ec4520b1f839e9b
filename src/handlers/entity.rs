//! Entity CRUD handlers: list, create, update, destroy, platform counts.

use crate::error::AppError;
use crate::extractors::{BizId, Operator};
use crate::response::{success_many, success_one, SuccessOne};
use crate::schema::EntityDef;
use crate::service::{CrudService, FilterSet, RequestSerializer, ResponseSerializer};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn resolve<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a EntityDef, AppError> {
    state
        .registry
        .entity_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(path_segment.to_string()))
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

/// List with declared filters and pagination. Biz-scoped entities are pinned
/// to the caller's business unit unless the caller filtered by biz_id
/// explicitly; an explicit value is used verbatim.
pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    biz: BizId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let mut filters = FilterSet::from_query(entity, &params);
    if entity.biz_scoped {
        filters.scope_to_biz(biz.or_unscoped());
    }
    let (rows, total) = CrudService::list(
        &state.pool,
        entity,
        &filters.predicates,
        filters.limit,
        filters.offset,
    )
    .await?;
    let data = ResponseSerializer::shape_many(entity, &rows);
    Ok((
        StatusCode::OK,
        Json(success_many(data, total, filters.limit, filters.offset)),
    ))
}

/// Create per the entity's create mode. Validation failures return field
/// errors without touching storage; duplicate unique keys are a conflict.
pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    operator: Operator,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let mut body = RequestSerializer::validate_create(entity, body)?;
    if !operator.0.is_empty() {
        body.insert("created_by".into(), Value::String(operator.0));
    }
    let row = CrudService::create(&state.pool, entity, &body).await?;
    let data = ResponseSerializer::shape(entity, &row);
    Ok((StatusCode::CREATED, Json(success_one(data))))
}

/// Partial update by id. A missing id is a no-op success, not an error:
/// `data` is null and `meta.updated` is 0.
pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    operator: Operator,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    let mut body = RequestSerializer::validate_partial(entity, body)?;
    if !operator.0.is_empty() {
        body.insert("updated_by".into(), Value::String(operator.0));
    }
    let (data, updated) = match CrudService::update(&state.pool, entity, id, &body).await? {
        Some(row) => (ResponseSerializer::shape(entity, &row), 1),
        None => (Value::Null, 0),
    };
    Ok((
        StatusCode::OK,
        Json(SuccessOne {
            data,
            meta: Some(json!({ "updated": updated })),
        }),
    ))
}

/// Soft delete by id; idempotent, so an absent id still succeeds.
pub async fn destroy(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    CrudService::destroy(&state.pool, entity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Platform breakdown for im types: live record count per platform.
pub async fn im_platforms(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state, "im-types")?;
    let rows = CrudService::grouped_counts(&state.pool, entity, "platform").await?;
    let count = rows.len();
    Ok((
        StatusCode::OK,
        Json(SuccessOne {
            data: Value::Array(rows),
            meta: Some(json!({ "count": count })),
        }),
    ))
}
