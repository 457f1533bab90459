//! Session Context - 会话上下文

mod ad_break;
mod log_message;
mod metadata_url;
mod value_objects;

pub use ad_break::AdBreak;
pub use log_message::{LogLevel, LogMessage};
pub use metadata_url::rewrite_to_metadata_url;
pub use value_objects::{LocalSessionId, MetadataType, SessionConfig, SessionDescriptor};
