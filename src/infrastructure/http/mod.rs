//! HTTP Layer - 控制 API + WebSocket
//!
//! 宿主播放器进程通过 HTTP 驱动会话协调器，通过 WebSocket 订阅字段变化

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
