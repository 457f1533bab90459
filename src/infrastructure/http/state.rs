//! Application State

use std::sync::Arc;

use crate::application::SessionCoordinator;
use crate::infrastructure::memory::InMemoryPlayer;

/// 应用状态
pub struct AppState {
    pub coordinator: Arc<SessionCoordinator>,
    /// 与协调器共享的播放器，WebSocket 订阅其条目变化
    pub player: Arc<InMemoryPlayer>,
}

impl AppState {
    pub fn new(coordinator: Arc<SessionCoordinator>, player: Arc<InMemoryPlayer>) -> Self {
        Self { coordinator, player }
    }
}
