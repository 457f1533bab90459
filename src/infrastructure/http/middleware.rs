//! HTTP Middleware
//!
//! 请求耗时与 HTTP 状态码错误日志

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 超过该耗时的请求按慢请求记录（毫秒）
const SLOW_REQUEST_MS: u128 = 2_000;

/// HTTP 状态码错误日志中间件
///
/// 4xx/5xx 记录日志；业务错误（errno != 0）在 ApiError::into_response() 中记录。
/// `wait=true` 的解析请求可能持续到网络超时，慢请求单独记一条 warn
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        );
    } else if elapsed_ms >= SLOW_REQUEST_MS {
        tracing::warn!(method = %method, uri = %uri, elapsed_ms = elapsed_ms, "Slow request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::{get, post},
        Router,
    };
    use tower::util::ServiceExt;

    async fn snapshot_handler() -> &'static str {
        "{}"
    }

    async fn rejected_handler() -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    async fn failing_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/api/session", get(snapshot_handler))
            .route("/api/session/media_url", post(rejected_handler))
            .route("/api/player/reload", post(failing_handler))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        create_test_router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_responses_pass_through_unchanged() {
        assert_eq!(status_of("GET", "/api/session").await, StatusCode::OK);
        assert_eq!(
            status_of("POST", "/api/session/media_url").await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of("POST", "/api/player/reload").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_client_error() {
        assert_eq!(status_of("GET", "/api/unknown").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("GET", "/api/player/reload").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
