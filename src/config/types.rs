//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::session::{MetadataType, SessionConfig};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 会话解析 HTTP 客户端配置
    #[serde(default)]
    pub http_client: HttpClientConfig,

    /// 会话初始设置
    #[serde(default)]
    pub session: SessionSection,

    /// 播放头追踪配置
    #[serde(default)]
    pub playhead: PlayheadConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 客户端配置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpClientConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// GET 回退时最多跟随的重定向次数
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// 会话初始设置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// 启动后立即解析的媒体 URL
    #[serde(default)]
    pub media_url: Option<String>,

    #[serde(default = "default_is_init_request")]
    pub is_init_request: bool,

    #[serde(default)]
    pub automatically_preserves_time_offset_from_live: bool,

    #[serde(default)]
    pub metadata_type: MetadataType,

    /// 信标请求附带的自定义请求头
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

fn default_is_init_request() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            media_url: None,
            is_init_request: default_is_init_request(),
            automatically_preserves_time_offset_from_live: false,
            metadata_type: MetadataType::default(),
            custom_headers: HashMap::new(),
        }
    }
}

impl SessionSection {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            is_init_request: self.is_init_request,
            automatically_preserves_time_offset_from_live: self
                .automatically_preserves_time_offset_from_live,
            metadata_type: self.metadata_type,
            custom_headers_for_beaconing: self.custom_headers.clone(),
        }
    }
}

/// 播放头追踪配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlayheadConfig {
    /// 连续性容差（秒）：播放位置前进量与经过时间之差在此范围内视为连续播放
    #[serde(default = "default_tolerance")]
    pub discontinuity_tolerance_secs: f64,
}

fn default_tolerance() -> f64 {
    1.0
}

impl Default for PlayheadConfig {
    fn default() -> Self {
        Self {
            discontinuity_tolerance_secs: default_tolerance(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "127.0.0.1:5070");
        assert_eq!(config.http_client.timeout_secs, 10);
        assert!(config.session.is_init_request);
        assert!(config.session.media_url.is_none());
        assert_eq!(config.playhead.discontinuity_tolerance_secs, 1.0);
    }

    #[test]
    fn test_session_section_to_session_config() {
        let section = SessionSection {
            metadata_type: MetadataType::Cumulative,
            custom_headers: HashMap::from([("X-Device".to_string(), "tv".to_string())]),
            ..SessionSection::default()
        };
        let config = section.to_session_config();
        assert!(config.is_init_request);
        assert_eq!(config.metadata_type, MetadataType::Cumulative);
        assert_eq!(config.custom_headers_for_beaconing["X-Device"], "tv");
    }
}
