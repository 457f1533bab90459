//! Player Port - 播放器抽象
//!
//! 播放器是单一所有者的可变资源，只有重新加载路径会替换其当前条目

use serde::Serialize;

/// 可播放条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerItem {
    pub url: String,
    pub automatically_preserves_time_offset_from_live: bool,
}

/// Player Port
pub trait PlayerPort: Send + Sync {
    /// 取消与当前条目绑定的插播事件
    fn cancel_current_event(&self, resumption_offset: f64);

    /// 原子地替换当前条目，旧条目直接丢弃
    fn replace_current_item(&self, item: PlayerItem);

    fn current_item(&self) -> Option<PlayerItem>;
}
