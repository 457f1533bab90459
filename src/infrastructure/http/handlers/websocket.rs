//! WebSocket Handler - 会话字段变化推送
//!
//! 连接建立后先推送一次完整快照，之后每个字段变化推送一条事件

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::{PlayerItem, SessionSettings, SessionSnapshot, SessionState};
use crate::domain::playback::{DataRange, WatchedRanges};
use crate::domain::session::{AdBreak, LogMessage, SessionDescriptor};
use crate::infrastructure::http::state::AppState;

/// 推送给客户端的事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Snapshot(SessionSnapshot),
    SessionChanged(SessionDescriptor),
    SettingsChanged(SessionSettings),
    AdPodsChanged { ad_pods: Vec<AdBreak> },
    WatchedRangesChanged {
        watched_ranges: WatchedRanges,
        latest_data_range: Option<DataRange>,
    },
    OutOfRangeChanged { played_time_outside_data_range: Vec<DataRange> },
    /// 只推送新增的日志
    LogAppended { messages: Vec<LogMessage> },
    PlayerItemChanged { item: Option<PlayerItem> },
    CustomHeadersChanged { custom_headers_for_beaconing: HashMap<String, String> },
    DebugOverlayChanged { is_show_debug_overlay: bool },
    PlayerControlFocusChanged { player_control_is_focused: bool },
}

/// 一个连接的事件源：订阅所有公开字段，按变化产出事件
struct SessionEventStream {
    state: Arc<SessionState>,
    session_rx: watch::Receiver<SessionDescriptor>,
    settings_rx: watch::Receiver<SessionSettings>,
    ad_pods_rx: watch::Receiver<Vec<AdBreak>>,
    watched_rx: watch::Receiver<WatchedRanges>,
    out_of_range_rx: watch::Receiver<Vec<DataRange>>,
    logs_rx: watch::Receiver<Vec<LogMessage>>,
    headers_rx: watch::Receiver<HashMap<String, String>>,
    overlay_rx: watch::Receiver<bool>,
    focus_rx: watch::Receiver<bool>,
    item_rx: watch::Receiver<Option<PlayerItem>>,
    sent_logs: usize,
}

impl SessionEventStream {
    fn new(state: Arc<SessionState>, item_rx: watch::Receiver<Option<PlayerItem>>) -> Self {
        let mut logs_rx = state.subscribe_log_messages();
        let sent_logs = logs_rx.borrow_and_update().len();
        Self {
            session_rx: state.subscribe_session(),
            settings_rx: state.subscribe_settings(),
            ad_pods_rx: state.subscribe_ad_pods(),
            watched_rx: state.subscribe_watched_ranges(),
            out_of_range_rx: state.subscribe_out_of_range(),
            logs_rx,
            headers_rx: state.subscribe_custom_headers(),
            overlay_rx: state.subscribe_debug_overlay_visible(),
            focus_rx: state.subscribe_player_control_focused(),
            item_rx,
            sent_logs,
            state,
        }
    }

    /// 订阅之后的第一条事件
    fn snapshot(&self) -> SessionEvent {
        SessionEvent::Snapshot(self.state.snapshot())
    }

    /// 等待下一次字段变化；所有发送端关闭后返回 None
    async fn next(&mut self) -> Option<SessionEvent> {
        let event = tokio::select! {
            Ok(()) = self.session_rx.changed() => {
                SessionEvent::SessionChanged(self.session_rx.borrow_and_update().clone())
            }
            Ok(()) = self.settings_rx.changed() => {
                SessionEvent::SettingsChanged(self.settings_rx.borrow_and_update().clone())
            }
            Ok(()) = self.ad_pods_rx.changed() => SessionEvent::AdPodsChanged {
                ad_pods: self.ad_pods_rx.borrow_and_update().clone(),
            },
            Ok(()) = self.watched_rx.changed() => SessionEvent::WatchedRangesChanged {
                watched_ranges: self.watched_rx.borrow_and_update().clone(),
                latest_data_range: self.state.latest_data_range(),
            },
            Ok(()) = self.out_of_range_rx.changed() => SessionEvent::OutOfRangeChanged {
                played_time_outside_data_range: self.out_of_range_rx.borrow_and_update().clone(),
            },
            Ok(()) = self.logs_rx.changed() => {
                let messages = self.logs_rx.borrow_and_update();
                let fresh = messages.get(self.sent_logs..).unwrap_or_default().to_vec();
                self.sent_logs = messages.len();
                SessionEvent::LogAppended { messages: fresh }
            }
            Ok(()) = self.headers_rx.changed() => SessionEvent::CustomHeadersChanged {
                custom_headers_for_beaconing: self.headers_rx.borrow_and_update().clone(),
            },
            Ok(()) = self.overlay_rx.changed() => SessionEvent::DebugOverlayChanged {
                is_show_debug_overlay: *self.overlay_rx.borrow_and_update(),
            },
            Ok(()) = self.focus_rx.changed() => SessionEvent::PlayerControlFocusChanged {
                player_control_is_focused: *self.focus_rx.borrow_and_update(),
            },
            Ok(()) = self.item_rx.changed() => SessionEvent::PlayerItemChanged {
                item: self.item_rx.borrow_and_update().clone(),
            },
            else => return None,
        };
        Some(event)
    }
}

/// 事件 WebSocket 连接处理
pub async fn events_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_events_socket(socket, state))
}

async fn handle_events_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("Events WebSocket connected");

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        let mut events = SessionEventStream::new(
            state.coordinator.state().clone(),
            state.player.subscribe(),
        );
        if send_event(&mut sender, &events.snapshot()).await.is_err() {
            return;
        }

        while let Some(event) = events.next().await {
            if send_event(&mut sender, &event).await.is_err() {
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Events WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Events WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Events WebSocket disconnected");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &SessionEvent,
) -> Result<(), axum::Error> {
    let msg = match serde_json::to_string(event) {
        Ok(json) => Message::Text(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            return Ok(());
        }
    };

    sender.send(msg).await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to send WebSocket message");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionConfig;
    use crate::infrastructure::memory::InMemoryPlayer;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = SessionEvent::OutOfRangeChanged {
            played_time_outside_data_range: vec![DataRange::new(50.0, 52.0)],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "out_of_range_changed");
        assert_eq!(json["played_time_outside_data_range"][0]["start"], 50.0);

        let settings = SessionEvent::SettingsChanged(SessionSettings::from_config(&SessionConfig::default()));
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["type"], "settings_changed");
        assert_eq!(json["is_init_request"], true);
    }

    #[test]
    fn test_pass_through_events_serialize_with_field_names() {
        let event = SessionEvent::DebugOverlayChanged {
            is_show_debug_overlay: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "debug_overlay_changed");
        assert_eq!(json["is_show_debug_overlay"], false);

        let event = SessionEvent::CustomHeadersChanged {
            custom_headers_for_beaconing: HashMap::from([("X-Device".to_string(), "tv".to_string())]),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "custom_headers_changed");
        assert_eq!(json["custom_headers_for_beaconing"]["X-Device"], "tv");
    }

    #[tokio::test]
    async fn test_stream_pushes_pass_through_changes() {
        let state = Arc::new(SessionState::default());
        let player = InMemoryPlayer::new();
        let mut events = SessionEventStream::new(state.clone(), player.subscribe());
        assert!(matches!(events.snapshot(), SessionEvent::Snapshot(_)));

        state.set_custom_headers(HashMap::from([("X-Device".to_string(), "tv".to_string())]));
        match events.next().await {
            Some(SessionEvent::CustomHeadersChanged {
                custom_headers_for_beaconing,
            }) => assert_eq!(custom_headers_for_beaconing["X-Device"], "tv"),
            other => panic!("unexpected event: {:?}", other),
        }

        state.set_debug_overlay_visible(false);
        assert!(matches!(
            events.next().await,
            Some(SessionEvent::DebugOverlayChanged {
                is_show_debug_overlay: false
            })
        ));

        state.set_player_control_focused(true);
        assert!(matches!(
            events.next().await,
            Some(SessionEvent::PlayerControlFocusChanged {
                player_control_is_focused: true
            })
        ));
    }
}
