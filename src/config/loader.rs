//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;
use url::Url;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `ADBEACON_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `ADBEACON_SERVER__PORT=8080`
/// - `ADBEACON_SESSION__MEDIA_URL=https://example.com/master.m3u8`
/// - `ADBEACON_SESSION__IS_INIT_REQUEST=false`
/// - `ADBEACON_PLAYHEAD__DISCONTINUITY_TOLERANCE_SECS=0.5`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5070)?
        .set_default("http_client.timeout_secs", 10)?
        .set_default("http_client.max_redirects", 10)?
        .set_default("session.is_init_request", true)?
        .set_default("session.automatically_preserves_time_offset_from_live", false)?
        .set_default("session.metadata_type", "latest_only")?
        .set_default("playhead.discontinuity_tolerance_secs", 1.0)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("ADBEACON")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.http_client.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "HTTP client timeout cannot be 0".to_string(),
        ));
    }

    let tolerance = config.playhead.discontinuity_tolerance_secs;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "Discontinuity tolerance must be a non-negative number, got {}",
            tolerance
        )));
    }

    // 空字符串等同于未设置
    if let Some(media_url) = config.session.media_url.as_deref().filter(|u| !u.is_empty()) {
        Url::parse(media_url).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid session.media_url '{}': {}", media_url, e))
        })?;
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("HTTP Client Timeout: {}s", config.http_client.timeout_secs);
    tracing::info!("HTTP Client Max Redirects: {}", config.http_client.max_redirects);
    match config.session.media_url.as_deref() {
        Some(url) if !url.is_empty() => tracing::info!("Initial Media URL: {}", url),
        _ => tracing::info!("Initial Media URL: (none)"),
    }
    tracing::info!("Init Request: {}", config.session.is_init_request);
    tracing::info!("Metadata Type: {}", config.session.metadata_type);
    tracing::info!(
        "Preserve Live Offset: {}",
        config.session.automatically_preserves_time_offset_from_live
    );
    tracing::info!("Custom Beacon Headers: {}", config.session.custom_headers.len());
    tracing::info!(
        "Discontinuity Tolerance: {}s",
        config.playhead.discontinuity_tolerance_secs
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
