//! Session Context - Value Objects

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 进程内解析序号，保证同一时间戳下的会话 ID 不冲突
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// 本地会话标识
///
/// 格式: `<ISO-8601 UTC 毫秒时间戳>#<序号>`，单调递增且不会碰撞
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocalSessionId(String);

impl LocalSessionId {
    pub fn generate() -> Self {
        let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Self(format!("{}#{}", timestamp, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for LocalSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会话描述符
///
/// 不变量:
/// - 构造后不可变，新的解析结果整体替换旧值
/// - 默认值为占位描述符（所有字段为空）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionDescriptor {
    local_session_id: LocalSessionId,
    media_url: String,
    manifest_url: String,
    ad_tracking_metadata_url: String,
}

impl SessionDescriptor {
    /// 创建新的描述符，并分配新的本地会话 ID
    pub fn new(
        media_url: impl Into<String>,
        manifest_url: impl Into<String>,
        ad_tracking_metadata_url: impl Into<String>,
    ) -> Self {
        Self {
            local_session_id: LocalSessionId::generate(),
            media_url: media_url.into(),
            manifest_url: manifest_url.into(),
            ad_tracking_metadata_url: ad_tracking_metadata_url.into(),
        }
    }

    pub fn local_session_id(&self) -> &LocalSessionId {
        &self.local_session_id
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    pub fn ad_tracking_metadata_url(&self) -> &str {
        &self.ad_tracking_metadata_url
    }

    /// 是否为尚未解析过的占位描述符
    pub fn is_placeholder(&self) -> bool {
        self.local_session_id.is_empty()
    }
}

/// 广告追踪元数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataType {
    /// 只以最新的元数据快照为准
    #[default]
    LatestOnly,
    /// 累积所有快照
    Cumulative,
}

impl MetadataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatestOnly => "latest_only",
            Self::Cumulative => "cumulative",
        }
    }
}

impl std::fmt::Display for MetadataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会话选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// true: POST init 协议；false: 仅 GET
    pub is_init_request: bool,
    /// 重新配置播放器时透传
    pub automatically_preserves_time_offset_from_live: bool,
    pub metadata_type: MetadataType,
    /// 附加到所有追踪请求（不用于会话解析请求）
    pub custom_headers_for_beaconing: HashMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            is_init_request: true,
            automatically_preserves_time_offset_from_live: false,
            metadata_type: MetadataType::LatestOnly,
            custom_headers_for_beaconing: HashMap::new(),
        }
    }
}
