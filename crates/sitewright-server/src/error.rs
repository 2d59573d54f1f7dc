use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sitewright_core::SiteError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(SiteError::Validation(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<SiteError>() {
            if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else if e.is_assembly() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                match e {
                    SiteError::DeploymentNotFound(_) => StatusCode::NOT_FOUND,
                    SiteError::DeployConflict { .. } => StatusCode::CONFLICT,
                    SiteError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
