//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET   健康检查
//! - /api/session                   GET   所有公开字段的快照
//! - /api/session/media_url         POST  设置媒体 URL（触发解析）
//! - /api/session/init_request      POST  切换 POST init 协议（值变化时重新解析）
//! - /api/session/metadata_type     POST  设置元数据类型（值变化时重新加载播放器）
//! - /api/session/live_offset       POST  设置直播偏移保留
//! - /api/session/custom_headers    POST  设置信标自定义请求头
//! - /api/session/info              POST  仅追踪模式，直接设置会话
//! - /api/session/ad_pods           POST  替换广告时段
//! - /api/session/debug_overlay     POST  调试浮层开关
//! - /api/logs                      GET   诊断日志
//! - /api/player/reload             POST  用清单 URL 重新加载播放器
//! - /api/player/playhead           POST  上报播放位置
//! - /api/player/item               GET   当前播放条目
//! - /api/player/focus              POST  播放器控件焦点
//! - /ws/events                     WS    字段变化推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/session", get(handlers::get_session))
        .nest("/session", session_routes())
        .route("/logs", get(handlers::get_logs))
        .nest("/player", player_routes())
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media_url", post(handlers::set_media_url))
        .route("/init_request", post(handlers::set_init_request))
        .route("/metadata_type", post(handlers::set_metadata_type))
        .route("/live_offset", post(handlers::set_live_offset))
        .route("/custom_headers", post(handlers::set_custom_headers))
        .route("/info", post(handlers::set_session_info))
        .route("/ad_pods", post(handlers::set_ad_pods))
        .route("/debug_overlay", post(handlers::set_debug_overlay))
}

/// Player 路由
fn player_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reload", post(handlers::reload))
        .route("/playhead", post(handlers::report_playhead))
        .route("/item", get(handlers::get_item))
        .route("/focus", post(handlers::set_control_focus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        CoordinatorConfig, InitResponse, PlayerPort, SessionCoordinator, TransportError,
    };
    use crate::domain::session::rewrite_to_metadata_url;
    use crate::infrastructure::adapters::session_client::FakeSessionClient;
    use crate::infrastructure::memory::InMemoryPlayer;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app_with(client: Arc<FakeSessionClient>) -> (Router, Arc<AppState>) {
        let player = Arc::new(InMemoryPlayer::new());
        let coordinator = Arc::new(SessionCoordinator::new(
            CoordinatorConfig::default(),
            client,
            Arc::new(rewrite_to_metadata_url),
            player.clone(),
        ));
        let state = Arc::new(AppState::new(coordinator, player));
        (create_routes().with_state(state.clone()), state)
    }

    fn app() -> (Router, Arc<AppState>) {
        app_with(Arc::new(FakeSessionClient::new()))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, _) = app();
        let body = json_body(app.oneshot(get_request("/api/ping")).await.unwrap()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["has_session"], false);
    }

    #[tokio::test]
    async fn test_set_media_url_and_wait() {
        let client = Arc::new(FakeSessionClient::new());
        client.on_init(
            "https://example.com/master.m3u8",
            Ok(InitResponse {
                manifest_url: "https://cdn.example.com/a.m3u8".to_string(),
                tracking_url: "https://cdn.example.com/metadata".to_string(),
            }),
        );
        let (app, _) = app_with(client);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/session/media_url",
                json!({"media_url": "https://example.com/master.m3u8", "wait": true}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["status"], "applied");
        assert_eq!(body["data"]["manifest_url"], "https://cdn.example.com/a.m3u8");

        let snapshot = json_body(app.oneshot(get_request("/api/session")).await.unwrap()).await;
        assert_eq!(
            snapshot["data"]["session"]["ad_tracking_metadata_url"],
            "https://cdn.example.com/metadata"
        );
        assert_eq!(
            snapshot["data"]["settings"]["media_url"],
            "https://example.com/master.m3u8"
        );
    }

    #[tokio::test]
    async fn test_failed_resolution_with_wait_returns_service_unavailable() {
        let client = Arc::new(FakeSessionClient::new());
        client.on_init("https://example.com/broken.m3u8", Err(TransportError::Timeout));
        client.on_get(
            "https://example.com/broken.m3u8",
            Err(TransportError::HttpStatus {
                status: 500,
                url: "https://example.com/broken.m3u8".to_string(),
            }),
        );
        let (app, state) = app_with(client);

        let response = app
            .oneshot(post_json(
                "/api/session/media_url",
                json!({"media_url": "https://example.com/broken.m3u8", "wait": true}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["errno"], 503);
        assert!(body["error"].as_str().unwrap().contains("broken.m3u8"));
        assert!(body["data"].is_null());
        assert!(state.coordinator.state().current_session().is_placeholder());
    }

    #[tokio::test]
    async fn test_empty_media_url_is_skipped() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json("/api/session/media_url", json!({"media_url": ""})))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["status"], "skipped");
    }

    #[tokio::test]
    async fn test_session_info_then_metadata_type_reloads_player() {
        let (app, state) = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/session/info",
                json!({
                    "manifest_url": "https://cdn.example.com/a.m3u8",
                    "ad_tracking_metadata_url": "https://cdn.example.com/metadata"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["errno"], 0);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/session/metadata_type",
                json!({"metadata_type": "cumulative"}),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["errno"], 0);
        assert_eq!(state.player.cancelled_events(), 1);

        let body = json_body(app.oneshot(get_request("/api/player/item")).await.unwrap()).await;
        assert_eq!(body["data"]["url"], "https://cdn.example.com/a.m3u8");
    }

    #[tokio::test]
    async fn test_reload_with_invalid_url_returns_errno() {
        let (app, state) = app();
        let response = app
            .oneshot(post_json(
                "/api/player/reload",
                json!({"manifest_url": "not a url"}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["errno"], 400);
        assert!(state.player.current_item().is_none());
    }

    #[tokio::test]
    async fn test_playhead_reports_latest_position() {
        let (app, state) = app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/player/playhead",
                json!({"position": 10.0, "is_playing": true}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["latest_playhead"], 10.0);
        assert_eq!(state.coordinator.state().watched_ranges().len(), 1);

        let response = app
            .oneshot(post_json(
                "/api/player/playhead",
                json!({"position": -1.0, "is_playing": true}),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["errno"], 400);
    }

    #[tokio::test]
    async fn test_pass_through_fields() {
        let (app, state) = app();
        app.clone()
            .oneshot(post_json(
                "/api/session/custom_headers",
                json!({"headers": {"X-Device": "tv"}}),
            ))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json("/api/session/debug_overlay", json!({"enabled": false})))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json(
                "/api/session/ad_pods",
                json!({"ad_pods": [{"id": "pod-1", "start_time": 30.0, "duration": 15.0}]}),
            ))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json("/api/player/focus", json!({"enabled": true})))
            .await
            .unwrap();

        let snapshot = state.coordinator.state().snapshot();
        assert_eq!(snapshot.custom_headers_for_beaconing["X-Device"], "tv");
        assert!(!snapshot.is_show_debug_overlay);
        assert!(snapshot.player_control_is_focused);
        assert_eq!(snapshot.ad_pods.len(), 1);

        let logs = json_body(app.oneshot(get_request("/api/logs")).await.unwrap()).await;
        assert!(logs["data"].is_array());
    }
}
