//! 应用层错误定义

use thiserror::Error;

use crate::application::ports::TransportError;

/// 会话解析失败（POST 与 GET 均失败）
///
/// 调用方保留旧会话，不清空
#[derive(Debug, Clone, Error)]
#[error("Failed to resolve session for {media_url}: {source}")]
pub struct ResolutionFailure {
    pub media_url: String,
    /// POST init 失败原因（未尝试 init 时为 None）
    pub init_error: Option<TransportError>,
    /// GET 失败原因
    pub source: TransportError,
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部服务错误（会话解析失败）
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误（后台任务异常退出）
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<ResolutionFailure> for ApplicationError {
    fn from(err: ResolutionFailure) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}
