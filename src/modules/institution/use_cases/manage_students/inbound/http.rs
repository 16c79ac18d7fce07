use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::modules::institution::core::student::StudentView;
use crate::modules::institution::use_cases::manage_students::command::StudentChanges;
use crate::shared::core::errors::ApplicationError;
use crate::shared::inbound::http::json_body;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentsQuery {
    pub department_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StudentsQuery>,
) -> Result<Json<Vec<StudentView>>, ApplicationError> {
    Ok(Json(
        state.students.list(query.department_id.as_deref()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<StudentChanges>, JsonRejection>,
) -> Result<impl IntoResponse, ApplicationError> {
    let student = state.students.create(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentView>, ApplicationError> {
    Ok(Json(state.students.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StudentChanges>, JsonRejection>,
) -> Result<Json<StudentView>, ApplicationError> {
    Ok(Json(state.students.update(&id, json_body(body)?).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApplicationError> {
    state.students.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted Student" })))
}
