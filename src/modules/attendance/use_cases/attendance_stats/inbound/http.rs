use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::modules::attendance::use_cases::attendance_stats::handler::{
    DepartmentStats, OverallStats, SubjectStats,
};
use crate::shared::core::errors::ApplicationError;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BySubjectParams {
    pub department_id: Option<String>,
}

pub async fn overall(
    State(state): State<AppState>,
) -> Result<Json<OverallStats>, ApplicationError> {
    Ok(Json(state.attendance_stats.overall().await?))
}

pub async fn by_department(
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartmentStats>>, ApplicationError> {
    Ok(Json(state.attendance_stats.by_department().await?))
}

pub async fn by_subject(
    State(state): State<AppState>,
    Query(params): Query<BySubjectParams>,
) -> Result<Json<Vec<SubjectStats>>, ApplicationError> {
    Ok(Json(
        state
            .attendance_stats
            .by_subject(params.department_id.as_deref())
            .await?,
    ))
}
