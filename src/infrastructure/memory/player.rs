//! In-Memory Player Implementation
//!
//! 没有真实解码管线时的播放器替身：记录当前条目并通过 watch 通道广播，
//! WebSocket 订阅者可以据此驱动真正的播放器

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

use crate::application::ports::{PlayerItem, PlayerPort};

/// 内存播放器
pub struct InMemoryPlayer {
    item: watch::Sender<Option<PlayerItem>>,
    cancelled_events: AtomicUsize,
}

impl InMemoryPlayer {
    pub fn new() -> Self {
        Self {
            item: watch::Sender::new(None),
            cancelled_events: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PlayerItem>> {
        self.item.subscribe()
    }

    /// 累计取消的插播事件数
    pub fn cancelled_events(&self) -> usize {
        self.cancelled_events.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerPort for InMemoryPlayer {
    fn cancel_current_event(&self, resumption_offset: f64) {
        self.cancelled_events.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(resumption_offset = resumption_offset, "Current ad event cancelled");
    }

    fn replace_current_item(&self, item: PlayerItem) {
        tracing::info!(
            url = %item.url,
            preserve_live_offset = item.automatically_preserves_time_offset_from_live,
            "Player item replaced"
        );
        self.item.send_replace(Some(item));
    }

    fn current_item(&self) -> Option<PlayerItem> {
        self.item.borrow().clone()
    }
}
