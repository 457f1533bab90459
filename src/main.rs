//! AdBeacon - 客户端广告信标会话服务
//!
//! 启动会话协调器并暴露给宿主播放器进程的控制 API

use std::sync::Arc;

use adbeacon::application::{CoordinatorConfig, SessionCoordinator};
use adbeacon::config::{load_config, print_config};
use adbeacon::domain::session::rewrite_to_metadata_url;
use adbeacon::infrastructure::adapters::{HttpSessionClient, HttpSessionClientConfig};
use adbeacon::infrastructure::http::{AppState, HttpServer, ServerConfig};
use adbeacon::infrastructure::memory::InMemoryPlayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},adbeacon={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("AdBeacon - 广告信标会话服务");
    print_config(&config);

    // 创建会话解析客户端
    let client_config = HttpSessionClientConfig {
        timeout_secs: config.http_client.timeout_secs,
        max_redirects: config.http_client.max_redirects,
    };
    let client = Arc::new(HttpSessionClient::new(client_config)?);

    // 创建播放器与协调器
    let player = Arc::new(InMemoryPlayer::new());
    let coordinator_config = CoordinatorConfig {
        session: config.session.to_session_config(),
        discontinuity_tolerance_secs: config.playhead.discontinuity_tolerance_secs,
    };
    let coordinator = Arc::new(SessionCoordinator::new(
        coordinator_config,
        client,
        Arc::new(rewrite_to_metadata_url),
        player.clone(),
    ));

    // 配置了初始媒体 URL 时立即开始解析，不等待结果
    if let Some(media_url) = config.session.media_url.clone() {
        if coordinator.set_media_url(media_url).is_some() {
            tracing::info!("Initial session resolution started");
        }
    }

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, AppState::new(coordinator, player));

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
