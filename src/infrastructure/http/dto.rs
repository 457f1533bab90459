//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::session::{AdBreak, MetadataType};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetMediaUrlRequest {
    pub media_url: String,
    /// 为 true 时等待解析完成再返回
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetFlagRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetMetadataTypeRequest {
    pub metadata_type: MetadataType,
}

#[derive(Debug, Deserialize)]
pub struct SetCustomHeadersRequest {
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct SetSessionInfoRequest {
    pub manifest_url: String,
    pub ad_tracking_metadata_url: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetAdPodsRequest {
    pub ad_pods: Vec<AdBreak>,
}

/// 解析结果
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionDto {
    /// 未触发解析（空 URL 或值未变化）
    Skipped,
    /// 已在后台开始解析
    Pending,
    Applied {
        local_session_id: String,
        manifest_url: String,
        ad_tracking_metadata_url: String,
    },
    Superseded,
}

// ============================================================================
// Player DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReloadRequest {
    pub manifest_url: String,
    #[serde(default)]
    pub automatically_preserves_time_offset_from_live: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlayheadRequest {
    pub position: f64,
    pub is_playing: bool,
}

#[derive(Debug, Serialize)]
pub struct PlayheadResponse {
    pub latest_playhead: Option<f64>,
}
