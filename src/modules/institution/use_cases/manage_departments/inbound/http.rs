use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};

use crate::modules::institution::core::department::DepartmentView;
use crate::modules::institution::use_cases::manage_departments::command::DepartmentChanges;
use crate::shared::core::errors::ApplicationError;
use crate::shared::inbound::http::json_body;
use crate::shell::state::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartmentView>>, ApplicationError> {
    Ok(Json(state.departments.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<DepartmentChanges>, JsonRejection>,
) -> Result<impl IntoResponse, ApplicationError> {
    let department = state.departments.create(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DepartmentView>, ApplicationError> {
    Ok(Json(state.departments.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<DepartmentChanges>, JsonRejection>,
) -> Result<Json<DepartmentView>, ApplicationError> {
    Ok(Json(state.departments.update(&id, json_body(body)?).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApplicationError> {
    state.departments.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted Department" })))
}
