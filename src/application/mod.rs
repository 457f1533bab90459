//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SessionClient、Player、DiagnosticSink）
//! - resolver: 会话解析（POST init，失败回退 GET）
//! - bindings: 触发规则表
//! - session_state: 发布给观察者的会话状态
//! - coordinator: 执行规则表效果、处理播放头采样
//! - error: 应用层错误定义

pub mod bindings;
pub mod coordinator;
pub mod diagnostics;
pub mod error;
pub mod ports;
pub mod resolver;
pub mod session_state;

// Re-exports
pub use bindings::{Bindings, Effect, Trigger};
pub use coordinator::{CoordinatorConfig, ResolutionHandle, ResolutionOutcome, SessionCoordinator};
pub use diagnostics::SessionLogSink;
pub use error::{ApplicationError, ResolutionFailure};
pub use resolver::SessionResolver;
pub use session_state::{SessionSettings, SessionSnapshot, SessionState};

pub use ports::{
    // Diagnostics
    DiagnosticSinkPort,
    MetadataUrlRewriterPort,
    // Player
    PlayerItem,
    PlayerPort,
    // Session client
    FetchResponse,
    InitResponse,
    SessionClientPort,
    TransportError,
};
