//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod diagnostics;
mod player;
mod session_client;

pub use diagnostics::{DiagnosticSinkPort, MetadataUrlRewriterPort};
pub use player::{PlayerItem, PlayerPort};
pub use session_client::{FetchResponse, InitResponse, SessionClientPort, TransportError};
