use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::dispatcher::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(AnalysisError::ProviderUnavailable) => {
                tracing::error!("Analysis requested but no AI provider is configured");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PROVIDER_UNAVAILABLE",
                    "AI analysis is not configured on this server".to_string(),
                )
            }
            AppError::Analysis(AnalysisError::Upstream(e)) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Analysis(e @ AnalysisError::EmptyUpstreamResponse { .. }) => {
                tracing::warn!("{e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMPTY_UPSTREAM_RESPONSE",
                    "The AI returned an empty response. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::analysis::ProviderKind;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::Validation("short".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AnalysisError::ProviderUnavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(
                AnalysisError::Upstream(LlmError::Api {
                    status: 401,
                    message: "bad key".into()
                })
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                AnalysisError::EmptyUpstreamResponse {
                    provider: ProviderKind::OpenAi,
                    model: "gpt-5".into()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }
}
