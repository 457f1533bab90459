//! 诊断日志条目

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// 会话日志消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// 产生日志的组件
    pub source: String,
    pub level: LogLevel,
}

impl LogMessage {
    pub fn new(message: impl Into<String>, source: impl Into<String>, level: LogLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            message: message.into(),
            source: source.into(),
            level,
        }
    }
}
