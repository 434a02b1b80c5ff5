pub mod addresses;
pub mod appointments;
pub mod patients;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use panda_core::PandaError;
use serde::Deserialize;
use serde_json::json;

/// Service error with the HTTP mapping applied.
///
/// Missing referenced entities are 404; state-machine and uniqueness
/// violations are 403; validator rejections are 422; storage failures
/// are 500. Bodies are `{"detail": "<message>"}`.
pub struct ApiError(pub PandaError);

impl From<PandaError> for ApiError {
    fn from(err: PandaError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PandaError::NotFound { .. } => StatusCode::NOT_FOUND,
            PandaError::Conflict { .. } | PandaError::Forbidden(_) => StatusCode::FORBIDDEN,
            PandaError::Format(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PandaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

/// Common offset/limit query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page: Pagination = serde_json::from_value(json!({})).unwrap();
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, 100);
    }
}
