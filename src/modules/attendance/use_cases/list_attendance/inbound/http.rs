use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::modules::attendance::use_cases::list_attendance::handler::AttendanceQuery;
use crate::modules::attendance::use_cases::list_attendance::view::AttendanceView;
use crate::shared::core::errors::ApplicationError;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceListParams {
    pub date: Option<String>,
    pub subject_id: Option<String>,
    pub department_id: Option<String>,
    pub student_id: Option<String>,
}

pub async fn handle(
    State(state): State<AppState>,
    Query(params): Query<AttendanceListParams>,
) -> Result<Json<Vec<AttendanceView>>, ApplicationError> {
    let query = AttendanceQuery {
        date: params.date,
        subject_id: params.subject_id,
        department_id: params.department_id,
        student_id: params.student_id,
    };
    Ok(Json(state.list_attendance.list(query).await?))
}
