//! Ad Break - 广告插播点
//!
//! 由外部元数据解析器产出，会话核心只做存储和转发

use serde::{Deserialize, Serialize};

/// 广告插播点（一个 ad pod）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdBreak {
    pub id: String,
    /// 在播放时间轴上的起点（秒）
    pub start_time: f64,
    /// 时长（秒）
    pub duration: f64,
    /// 广告条目，结构由解析器决定
    #[serde(default)]
    pub ads: Vec<serde_json::Value>,
}
