use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::modules::institution::core::subject::SubjectView;
use crate::modules::institution::use_cases::manage_subjects::command::SubjectChanges;
use crate::shared::core::errors::ApplicationError;
use crate::shared::inbound::http::json_body;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectsQuery {
    pub department_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SubjectsQuery>,
) -> Result<Json<Vec<SubjectView>>, ApplicationError> {
    Ok(Json(
        state.subjects.list(query.department_id.as_deref()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<SubjectChanges>, JsonRejection>,
) -> Result<impl IntoResponse, ApplicationError> {
    let subject = state.subjects.create(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubjectView>, ApplicationError> {
    Ok(Json(state.subjects.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SubjectChanges>, JsonRejection>,
) -> Result<Json<SubjectView>, ApplicationError> {
    Ok(Json(state.subjects.update(&id, json_body(body)?).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApplicationError> {
    state.subjects.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted Subject" })))
}
