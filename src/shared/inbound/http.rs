use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::shared::core::errors::ApplicationError;

impl ApplicationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::Validation(_)
            | ApplicationError::UnknownReference(_)
            | ApplicationError::Conflict { .. }
            | ApplicationError::InUse(_) => StatusCode::BAD_REQUEST,
            ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
            ApplicationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = match &self {
            ApplicationError::Conflict { field, .. } => {
                json!({ "message": self.to_string(), "field": field })
            }
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Unwraps a JSON body, turning extractor failures into a 400.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApplicationError> {
    body.map(|Json(inner)| inner)
        .map_err(|rejection| ApplicationError::Validation(rejection.body_text()))
}
