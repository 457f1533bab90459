//! Session State - 会话状态的唯一数据源
//!
//! 每个公开字段都通过 `tokio::sync::watch` 发布，读者总是看到完整的值。
//! 会话描述符只做整体替换，已观看区间只做单调累积

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::playback::{DataRange, OutOfRangeChange, PlayheadDecision, WatchedRanges};
use crate::domain::session::{
    AdBreak, LocalSessionId, LogMessage, MetadataType, SessionConfig, SessionDescriptor,
};

/// 触发规则相关的当前设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
    pub media_url: String,
    pub is_init_request: bool,
    pub automatically_preserves_time_offset_from_live: bool,
    pub metadata_type: MetadataType,
}

impl SessionSettings {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            media_url: String::new(),
            is_init_request: config.is_init_request,
            automatically_preserves_time_offset_from_live: config
                .automatically_preserves_time_offset_from_live,
            metadata_type: config.metadata_type,
        }
    }
}

/// 所有公开字段的快照
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session: SessionDescriptor,
    pub settings: SessionSettings,
    pub ad_pods: Vec<AdBreak>,
    pub watched_ranges: WatchedRanges,
    pub latest_data_range: Option<DataRange>,
    pub played_time_outside_data_range: Vec<DataRange>,
    pub custom_headers_for_beaconing: HashMap<String, String>,
    pub is_show_debug_overlay: bool,
    pub player_control_is_focused: bool,
}

/// 会话状态
pub struct SessionState {
    session: watch::Sender<SessionDescriptor>,
    settings: watch::Sender<SessionSettings>,
    ad_pods: watch::Sender<Vec<AdBreak>>,
    watched_ranges: watch::Sender<WatchedRanges>,
    latest_data_range: watch::Sender<Option<DataRange>>,
    out_of_range: watch::Sender<Vec<DataRange>>,
    log_messages: watch::Sender<Vec<LogMessage>>,
    custom_headers: watch::Sender<HashMap<String, String>>,
    debug_overlay_visible: watch::Sender<bool>,
    player_control_focused: watch::Sender<bool>,
    /// 最新的解析代数，只有匹配的解析结果才会被应用
    generation: AtomicU64,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            session: watch::Sender::new(SessionDescriptor::default()),
            settings: watch::Sender::new(SessionSettings::from_config(config)),
            ad_pods: watch::Sender::new(Vec::new()),
            watched_ranges: watch::Sender::new(WatchedRanges::new()),
            latest_data_range: watch::Sender::new(None),
            out_of_range: watch::Sender::new(Vec::new()),
            log_messages: watch::Sender::new(Vec::new()),
            custom_headers: watch::Sender::new(config.custom_headers_for_beaconing.clone()),
            debug_overlay_visible: watch::Sender::new(true),
            player_control_focused: watch::Sender::new(false),
            generation: AtomicU64::new(0),
        }
    }

    // ========== Session ==========

    pub fn current_session(&self) -> SessionDescriptor {
        self.session.borrow().clone()
    }

    pub fn current_session_id(&self) -> LocalSessionId {
        self.session.borrow().local_session_id().clone()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<SessionDescriptor> {
        self.session.subscribe()
    }

    /// 开始新一代解析，之前所有在途解析的结果都会被丢弃
    pub fn begin_resolution(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 整体替换会话，并清空会话范围内的观看记录
    ///
    /// 清空发生在会话写锁内，与 [`Self::apply_playhead`] 互斥
    pub fn replace_session(&self, descriptor: SessionDescriptor) {
        tracing::info!(
            local_session_id = %descriptor.local_session_id(),
            manifest_url = %descriptor.manifest_url(),
            metadata_url = %descriptor.ad_tracking_metadata_url(),
            "Session replaced"
        );
        self.session.send_modify(|current| {
            *current = descriptor;
            self.reset_watched();
        });
    }

    /// 仅当 `generation` 仍是最新一代时替换会话
    ///
    /// 检查、替换与清空观看记录在同一把 watch 写锁内完成
    pub fn replace_session_if_current(&self, generation: u64, descriptor: SessionDescriptor) -> bool {
        let local_session_id = descriptor.local_session_id().clone();
        let replaced = self.session.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = descriptor;
            self.reset_watched();
            true
        });

        if replaced {
            tracing::info!(
                generation = generation,
                local_session_id = %local_session_id,
                "Session replaced by resolution"
            );
        }
        replaced
    }

    // ========== Settings ==========

    pub fn settings(&self) -> SessionSettings {
        self.settings.borrow().clone()
    }

    pub fn subscribe_settings(&self) -> watch::Receiver<SessionSettings> {
        self.settings.subscribe()
    }

    pub fn publish_settings(&self, settings: SessionSettings) {
        self.settings.send_if_modified(|current| {
            if *current == settings {
                return false;
            }
            *current = settings;
            true
        });
    }

    // ========== Ad pods ==========

    pub fn ad_pods(&self) -> Vec<AdBreak> {
        self.ad_pods.borrow().clone()
    }

    pub fn subscribe_ad_pods(&self) -> watch::Receiver<Vec<AdBreak>> {
        self.ad_pods.subscribe()
    }

    pub fn set_ad_pods(&self, ad_pods: Vec<AdBreak>) {
        tracing::debug!(count = ad_pods.len(), "Ad pods replaced");
        self.ad_pods.send_replace(ad_pods);
    }

    // ========== Watched ranges ==========

    pub fn watched_ranges(&self) -> WatchedRanges {
        self.watched_ranges.borrow().clone()
    }

    /// 不拷贝地读取已观看区间
    pub fn with_watched_ranges<R>(&self, f: impl FnOnce(&WatchedRanges) -> R) -> R {
        f(&self.watched_ranges.borrow())
    }

    pub fn subscribe_watched_ranges(&self) -> watch::Receiver<WatchedRanges> {
        self.watched_ranges.subscribe()
    }

    pub fn latest_data_range(&self) -> Option<DataRange> {
        *self.latest_data_range.borrow()
    }

    pub fn subscribe_latest_data_range(&self) -> watch::Receiver<Option<DataRange>> {
        self.latest_data_range.subscribe()
    }

    pub fn played_time_outside_data_range(&self) -> Vec<DataRange> {
        self.out_of_range.borrow().clone()
    }

    pub fn subscribe_out_of_range(&self) -> watch::Receiver<Vec<DataRange>> {
        self.out_of_range.subscribe()
    }

    /// 应用播放头追踪器为 `session_id` 算出的决策
    ///
    /// 整个应用过程持有会话读锁；会话已被替换时丢弃决策并返回 false
    pub fn apply_playhead(&self, session_id: &LocalSessionId, decision: PlayheadDecision) -> bool {
        let current = self.session.borrow();
        if current.local_session_id() != session_id {
            tracing::debug!(
                stale_session_id = %session_id,
                local_session_id = %current.local_session_id(),
                "Dropping playhead decision for replaced session"
            );
            return false;
        }

        if let Some(range) = decision.merge {
            let mut merged = range;
            self.watched_ranges.send_modify(|watched| {
                merged = watched.insert(range);
            });
            self.latest_data_range.send_replace(Some(merged));
        }

        match decision.out_of_range {
            Some(OutOfRangeChange::Open(range)) => {
                tracing::debug!(start = range.start, "Playback outside known data ranges");
                self.out_of_range.send_modify(|events| events.push(range));
            }
            Some(OutOfRangeChange::Extend(end)) => {
                self.out_of_range.send_if_modified(|events| match events.last_mut() {
                    Some(last) if end > last.end => {
                        last.end = end;
                        true
                    }
                    _ => false,
                });
            }
            None => {}
        }
        true
    }

    fn reset_watched(&self) {
        self.watched_ranges.send_replace(WatchedRanges::new());
        self.latest_data_range.send_replace(None);
        self.out_of_range.send_replace(Vec::new());
    }

    // ========== Accumulators ==========

    pub fn custom_headers(&self) -> HashMap<String, String> {
        self.custom_headers.borrow().clone()
    }

    pub fn subscribe_custom_headers(&self) -> watch::Receiver<HashMap<String, String>> {
        self.custom_headers.subscribe()
    }

    pub fn set_custom_headers(&self, headers: HashMap<String, String>) {
        self.custom_headers.send_replace(headers);
    }

    pub fn is_debug_overlay_visible(&self) -> bool {
        *self.debug_overlay_visible.borrow()
    }

    pub fn subscribe_debug_overlay_visible(&self) -> watch::Receiver<bool> {
        self.debug_overlay_visible.subscribe()
    }

    pub fn set_debug_overlay_visible(&self, visible: bool) {
        self.debug_overlay_visible.send_replace(visible);
    }

    pub fn is_player_control_focused(&self) -> bool {
        *self.player_control_focused.borrow()
    }

    pub fn subscribe_player_control_focused(&self) -> watch::Receiver<bool> {
        self.player_control_focused.subscribe()
    }

    pub fn set_player_control_focused(&self, focused: bool) {
        self.player_control_focused.send_replace(focused);
    }

    pub fn log_messages(&self) -> Vec<LogMessage> {
        self.log_messages.borrow().clone()
    }

    pub fn subscribe_log_messages(&self) -> watch::Receiver<Vec<LogMessage>> {
        self.log_messages.subscribe()
    }

    pub fn append_log_message(&self, entry: LogMessage) {
        self.log_messages.send_modify(|messages| messages.push(entry));
    }

    /// 所有公开字段的快照
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.current_session(),
            settings: self.settings(),
            ad_pods: self.ad_pods(),
            watched_ranges: self.watched_ranges(),
            latest_data_range: self.latest_data_range(),
            played_time_outside_data_range: self.played_time_outside_data_range(),
            custom_headers_for_beaconing: self.custom_headers(),
            is_show_debug_overlay: self.is_debug_overlay_visible(),
            player_control_is_focused: self.is_player_control_focused(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}
