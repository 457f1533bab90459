//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg.clone())
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        // 业务错误统一返回 200，由 errno 区分
        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::ExternalServiceError(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TransportError;
    use crate::application::ResolutionFailure;
    use axum::body::to_bytes;

    async fn errno_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_resolution_failure_maps_to_service_unavailable() {
        let failure = ResolutionFailure {
            media_url: "https://example.com/a.m3u8".to_string(),
            init_error: Some(TransportError::Timeout),
            source: TransportError::HttpStatus {
                status: 500,
                url: "https://example.com/a.m3u8".to_string(),
            },
        };
        let (status, body) = errno_of(ApiError::from(ApplicationError::from(failure))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["errno"], errno::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("https://example.com/a.m3u8"));
    }

    #[tokio::test]
    async fn test_validation_and_internal_errors() {
        let (_, body) = errno_of(ApplicationError::validation("bad url").into()).await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let (_, body) = errno_of(ApplicationError::internal("task panicked").into()).await;
        assert_eq!(body["errno"], errno::INTERNAL_ERROR);
        assert!(body["data"].is_null());
    }
}
