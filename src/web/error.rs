//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ConvenioError;

/// A [`ConvenioError`] on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub ConvenioError);

impl From<ConvenioError> for ApiError {
    fn from(err: ConvenioError) -> Self {
        Self(err)
    }
}

pub(crate) fn error_status(err: &ConvenioError) -> StatusCode {
    match err {
        ConvenioError::NotFound { .. } => StatusCode::NOT_FOUND,
        ConvenioError::Validation(_) | ConvenioError::Duplicate { .. } => StatusCode::BAD_REQUEST,
        ConvenioError::Protected { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            error_status(&ConvenioError::agreement_not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&ConvenioError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&ConvenioError::Duplicate {
                entity_type: "Company",
                identifier: "1".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&ConvenioError::Protected {
                entity_type: "Company",
                identifier: "1".into(),
                referenced_by: "contract(s)",
                count: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&ConvenioError::Storage("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
