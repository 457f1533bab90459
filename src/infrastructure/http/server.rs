//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::Router;
use http::header::CONTENT_TYPE;
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 预检结果缓存时间（秒）
const CORS_MAX_AGE_SECS: u64 = 600;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5070,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    fn build_router(&self) -> Router {
        // 控制 API 只有 GET/POST 与 JSON 请求体，不携带凭据
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
            .max_age(Duration::from_secs(CORS_MAX_AGE_SECS));

        create_routes()
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{CoordinatorConfig, SessionCoordinator};
    use crate::domain::session::rewrite_to_metadata_url;
    use crate::infrastructure::adapters::session_client::FakeSessionClient;
    use crate::infrastructure::memory::InMemoryPlayer;
    use axum::body::Body;
    use http::header::{
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
    };
    use http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn server() -> HttpServer {
        let player = Arc::new(InMemoryPlayer::new());
        let coordinator = Arc::new(SessionCoordinator::new(
            CoordinatorConfig::default(),
            Arc::new(FakeSessionClient::new()),
            Arc::new(rewrite_to_metadata_url),
            player.clone(),
        ));
        HttpServer::new(ServerConfig::default(), AppState::new(coordinator, player))
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_control_methods() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/session/media_url")
            .header(ORIGIN, "https://player.example.com")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = server().build_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "600");
        let methods = headers[ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("GET"));
        assert!(methods.contains("POST"));
        assert!(!methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn test_router_serves_ping_with_cors_header() {
        let request = Request::builder()
            .uri("/api/ping")
            .header(ORIGIN, "https://player.example.com")
            .body(Body::empty())
            .unwrap();
        let response = server().build_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_server_config_addr() {
        assert_eq!(ServerConfig::default().addr(), "127.0.0.1:5070");
        assert_eq!(ServerConfig::new("0.0.0.0", 8080).addr(), "0.0.0.0:8080");
    }
}
