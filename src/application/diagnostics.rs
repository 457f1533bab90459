//! Session Log Sink - 诊断日志出口
//!
//! 同时写入 tracing 与会话的 log_messages，随协调器创建和释放

use std::sync::Arc;

use crate::application::ports::DiagnosticSinkPort;
use crate::application::session_state::SessionState;
use crate::domain::session::{LogLevel, LogMessage};

pub struct SessionLogSink {
    state: Arc<SessionState>,
}

impl SessionLogSink {
    pub fn new(state: Arc<SessionState>) -> Self {
        Self { state }
    }
}

impl DiagnosticSinkPort for SessionLogSink {
    fn log(&self, message: &str, source: &str, level: LogLevel) {
        match level {
            LogLevel::Debug => tracing::debug!(source = %source, "{}", message),
            LogLevel::Info => tracing::info!(source = %source, "{}", message),
            LogLevel::Warning => tracing::warn!(source = %source, "{}", message),
            LogLevel::Error => tracing::error!(source = %source, "{}", message),
        }
        self.state
            .append_log_message(LogMessage::new(message, source, level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_appends_to_session_state() {
        let state = Arc::new(SessionState::default());
        let sink = SessionLogSink::new(state.clone());

        sink.log("Failed to load media", "SessionResolver", LogLevel::Warning);

        let messages = state.log_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Failed to load media");
        assert_eq!(messages[0].source, "SessionResolver");
        assert_eq!(messages[0].level, LogLevel::Warning);
    }
}
