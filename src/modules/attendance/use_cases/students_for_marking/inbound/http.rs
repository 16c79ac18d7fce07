use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::modules::institution::core::student::StudentSummary;
use crate::shared::core::errors::ApplicationError;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterParams {
    pub department_id: Option<String>,
    pub subject_id: Option<String>,
}

pub async fn handle(
    State(state): State<AppState>,
    Query(params): Query<RosterParams>,
) -> Result<Json<Vec<StudentSummary>>, ApplicationError> {
    let roster = state
        .students_for_marking
        .handle(params.department_id.as_deref(), params.subject_id.as_deref())
        .await?;
    Ok(Json(roster))
}
