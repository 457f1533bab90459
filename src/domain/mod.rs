//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Session Context: 会话描述符、元数据 URL 推导、广告插播点
//! - Playback Context: 已观看区间的累积与越界播放检测

pub mod playback;
pub mod session;
