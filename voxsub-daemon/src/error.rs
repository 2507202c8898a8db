//! HTTP mapping for pipeline errors: 400 for validation, 500 for everything else.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use voxsub_core::{ErrorKind, PipelineError};

pub struct ApiError(pub PipelineError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError(PipelineError::Validation(e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind: ErrorKind = self.0.kind();
        if status.is_server_error() {
            tracing::error!(kind = %kind, error = %self.0, "request failed");
        } else {
            tracing::warn!(kind = %kind, error = %self.0, "request rejected");
        }
        let body = serde_json::json!({
            "code": status.as_u16(),
            "error": kind.as_str(),
            "message": self.0.to_string(),
            "ts": crate::now_millis(),
        });
        (status, Json(body)).into_response()
    }
}
