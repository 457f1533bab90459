//! Ping Handler
//!
//! 健康检查，同时报告当前会话是否已建立

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// 尚未解析出任何会话时为 false
    pub has_session: bool,
}

pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        has_session: !state.coordinator.state().current_session().is_placeholder(),
    })
}
