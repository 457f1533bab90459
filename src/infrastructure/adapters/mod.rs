//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod session_client;

pub use session_client::*;
