//! AdBeacon - 客户端广告信标会话核心
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Session: 会话描述符、会话选项、元数据 URL 改写
//! - Playback: 已观看区间、播放头追踪
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SessionClient, Player, DiagnosticSink）
//! - Resolver: POST init 解析，失败回退 GET
//! - Bindings: 触发规则表
//! - Coordinator: 执行规则表效果，按代数丢弃过期解析
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP / Fake 会话客户端
//! - Memory: 内存播放器
//! - HTTP: 控制 API + WebSocket 事件推送

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
