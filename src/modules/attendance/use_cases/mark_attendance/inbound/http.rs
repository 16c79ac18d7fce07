use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;

use crate::modules::attendance::use_cases::mark_attendance::command::{
    AttendanceEntry, MarkAttendance,
};
use crate::modules::attendance::use_cases::mark_attendance::handler::MarkOutcome;
use crate::shared::core::errors::ApplicationError;
use crate::shared::inbound::http::json_body;
use crate::shell::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceBody {
    pub date: Option<String>,
    pub subject_id: Option<String>,
    pub department_id: Option<String>,
    /// Kept loose so one malformed entry does not reject the whole sheet.
    pub attendance_data: Option<Value>,
    pub marked_by: Option<String>,
}

impl From<MarkAttendanceBody> for MarkAttendance {
    fn from(body: MarkAttendanceBody) -> Self {
        let attendance_data = match body.attendance_data {
            Some(Value::Array(items)) => {
                Some(items.iter().map(AttendanceEntry::from_json).collect())
            }
            _ => None,
        };
        Self {
            date: body.date,
            subject_id: body.subject_id,
            department_id: body.department_id,
            attendance_data,
            marked_by: body.marked_by,
        }
    }
}

pub async fn handle(
    State(state): State<AppState>,
    body: Result<Json<MarkAttendanceBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApplicationError> {
    let command = MarkAttendance::from(json_body(body)?);
    Ok(match state.mark_attendance.handle(command).await? {
        MarkOutcome::Marked(summary) => (StatusCode::CREATED, Json(summary)),
        MarkOutcome::NothingToProcess(summary) => (StatusCode::OK, Json(summary)),
    })
}
