//! Entry handlers: list, create, read, update, delete.

use crate::error::AppError;
use crate::model::{EntryChanges, EntryId};
use crate::query::{ListParams, ListQuery};
use crate::response::{created, ok};
use crate::service::EntryService;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Ids are database surrogate keys; anything that is not one cannot name a record.
fn parse_id(id_str: &str) -> Result<EntryId, AppError> {
    id_str
        .trim()
        .parse::<EntryId>()
        .map_err(|_| AppError::NotFound(format!("entry {}", id_str)))
}

fn body_to_changes(body: Result<Json<Value>, JsonRejection>) -> Result<EntryChanges, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    EntryChanges::from_body(value)
}

/// GET /entries?order_by=&direction=&page=&per_page=&search=
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = ListQuery::from_params(&params, &state.limits)?;
    let listing = EntryService::list(state.store.as_ref(), &query).await?;
    Ok(ok(listing))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let changes = body_to_changes(body)?;
    let entry = EntryService::create(state.store.as_ref(), &changes).await?;
    Ok(created(entry))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let entry = EntryService::find(state.store.as_ref(), id).await?;
    Ok(ok(entry))
}

/// PATCH and PUT share partial-update semantics.
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let changes = body_to_changes(body)?;
    let entry = EntryService::update(state.store.as_ref(), id, &changes).await?;
    Ok(ok(entry))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    EntryService::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
