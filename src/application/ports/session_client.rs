//! Session Client Port - 会话解析的网络请求
//!
//! 定义 POST init 与 GET 两种请求的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 传输错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// POST init 响应（已解析为绝对 URL）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitResponse {
    pub manifest_url: String,
    pub tracking_url: String,
}

/// GET 响应
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// 跟随重定向后的最终 URL
    pub final_url: Option<String>,
}

/// Session Client Port
///
/// 会话解析请求不携带 beaconing 自定义头
#[async_trait]
pub trait SessionClientPort: Send + Sync {
    /// POST 初始化会话
    async fn make_init_request(&self, url: &str) -> Result<InitResponse, TransportError>;

    /// GET 请求（跟随重定向）
    async fn make_request(&self, url: &str) -> Result<FetchResponse, TransportError>;
}
