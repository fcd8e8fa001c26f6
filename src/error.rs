use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::validation::Issue;

/// Opaque code returned to clients in place of raw storage errors.
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";

/// Errors a matches handler can answer with.
///
/// Validation variants are raised before storage is touched and carry the
/// issue list; storage variants keep the underlying error for the log only.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid query parameters ({} issues)", .0.len())]
    InvalidQuery(Vec<Issue>),

    #[error("invalid payload ({} issues)", .0.len())]
    InvalidPayload(Vec<Issue>),

    #[error("failed to list matches: {0:#}")]
    ListFailed(anyhow::Error),

    #[error("failed to create match: {0:#}")]
    CreateFailed(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidQuery(issues) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid query parameters", "details": issues }),
            ),
            AppError::InvalidPayload(issues) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid payload", "details": issues }),
            ),
            AppError::ListFailed(err) => {
                tracing::error!(error = %format!("{err:#}"), "Failed to list matches");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to list matches." }),
                )
            }
            AppError::CreateFailed(err) => {
                tracing::error!(error = %format!("{err:#}"), "Failed to create match");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to create match", "details": STORAGE_ERROR }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueCode;
    use anyhow::anyhow;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_carries_details() {
        let issues = vec![Issue::new("limit", IssueCode::InvalidType, "bad")];
        let response = AppError::InvalidQuery(issues).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid query parameters");
        assert_eq!(json["details"][0]["path"][0], "limit");
        assert_eq!(json["details"][0]["code"], "invalid_type");
    }

    #[tokio::test]
    async fn test_create_failure_hides_raw_error() {
        let response =
            AppError::CreateFailed(anyhow!("password authentication failed")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to create match");
        assert_eq!(json["details"], STORAGE_ERROR);
        assert!(!json.to_string().contains("password"));
    }

    #[tokio::test]
    async fn test_list_failure_has_no_details() {
        let response = AppError::ListFailed(anyhow!("timeout")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json, json!({ "error": "Failed to list matches." }));
    }
}
