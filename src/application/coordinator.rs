//! Session Coordinator - 会话协调器
//!
//! 持有 SessionState，按 `Bindings` 规则表把外部触发转换为效果并执行：
//! - 解析在 tokio 任务中进行，结果按代数过滤，只有最新一代会生效
//! - 播放头采样同步处理，不会挂起
//! - 只有重新加载路径会替换播放器条目

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use url::Url;

use crate::application::bindings::{Bindings, Effect, Trigger};
use crate::application::diagnostics::SessionLogSink;
use crate::application::error::{ApplicationError, ResolutionFailure};
use crate::application::ports::{
    DiagnosticSinkPort, MetadataUrlRewriterPort, PlayerItem, PlayerPort, SessionClientPort,
};
use crate::application::resolver::SessionResolver;
use crate::application::session_state::SessionState;
use crate::domain::playback::{PlayheadSample, PlayheadTracker};
use crate::domain::session::{AdBreak, LogLevel, MetadataType, SessionConfig, SessionDescriptor};

const LOG_SOURCE: &str = "SessionCoordinator";

/// 协调器配置
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub session: SessionConfig,
    /// 播放头连续性容差（秒）
    pub discontinuity_tolerance_secs: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            discontinuity_tolerance_secs: 1.0,
        }
    }
}

/// 一次解析的最终结果
#[derive(Debug, Clone)]
pub enum ResolutionOutcome {
    /// 已替换当前会话
    Applied(SessionDescriptor),
    /// 完成时已有更新的解析，结果被丢弃
    Superseded,
    /// 两条路径都失败，旧会话保留
    Failed(ResolutionFailure),
}

pub type ResolutionHandle = JoinHandle<ResolutionOutcome>;

/// 会话协调器
pub struct SessionCoordinator {
    state: Arc<SessionState>,
    resolver: Arc<SessionResolver>,
    player: Arc<dyn PlayerPort>,
    sink: Arc<dyn DiagnosticSinkPort>,
    bindings: Mutex<Bindings>,
    tracker: Mutex<PlayheadTracker>,
}

impl SessionCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        client: Arc<dyn SessionClientPort>,
        rewriter: Arc<dyn MetadataUrlRewriterPort>,
        player: Arc<dyn PlayerPort>,
    ) -> Self {
        let state = Arc::new(SessionState::new(&config.session));
        let sink: Arc<dyn DiagnosticSinkPort> = Arc::new(SessionLogSink::new(state.clone()));
        let resolver = Arc::new(SessionResolver::new(client, rewriter, sink.clone()));

        Self {
            state,
            resolver,
            player,
            sink,
            bindings: Mutex::new(Bindings::new(&config.session)),
            tracker: Mutex::new(PlayheadTracker::new(config.discontinuity_tolerance_secs)),
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn player(&self) -> &Arc<dyn PlayerPort> {
        &self.player
    }

    // ========== Triggers ==========

    /// 设置媒体 URL；非空时开始解析并返回解析任务句柄
    pub fn set_media_url(&self, media_url: impl Into<String>) -> Option<ResolutionHandle> {
        self.dispatch(Trigger::MediaUrlSet(media_url.into()))
    }

    /// 切换 POST init / GET 协议；值变化且已有媒体 URL 时重新解析
    pub fn set_is_init_request(&self, enabled: bool) -> Option<ResolutionHandle> {
        self.dispatch(Trigger::IsInitRequestSet(enabled))
    }

    pub fn set_metadata_type(&self, metadata_type: MetadataType) {
        self.dispatch(Trigger::MetadataTypeSet(metadata_type));
    }

    pub fn set_automatically_preserves_time_offset_from_live(&self, enabled: bool) {
        self.dispatch(Trigger::PreserveLiveOffsetSet(enabled));
    }

    /// 仅追踪模式：直接设置会话，不经过网络解析
    pub fn set_session_info(
        &self,
        manifest_url: impl Into<String>,
        ad_tracking_metadata_url: impl Into<String>,
        media_url: Option<String>,
    ) {
        self.dispatch(Trigger::SessionInfoSet {
            manifest_url: manifest_url.into(),
            ad_tracking_metadata_url: ad_tracking_metadata_url.into(),
            media_url: media_url.unwrap_or_default(),
        });
    }

    fn dispatch(&self, trigger: Trigger) -> Option<ResolutionHandle> {
        // 持锁执行效果，保证代数分配顺序与触发顺序一致
        let mut bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.state.current_session();
        let effects = bindings.evaluate(trigger, &current);
        self.state.publish_settings(bindings.settings());

        let mut handle = None;
        for effect in effects {
            if let Some(h) = self.execute(effect) {
                handle = Some(h);
            }
        }
        handle
    }

    fn execute(&self, effect: Effect) -> Option<ResolutionHandle> {
        match effect {
            Effect::Resolve {
                media_url,
                use_init_protocol,
            } => Some(self.spawn_resolution(media_url, use_init_protocol)),
            Effect::ReplaceSession(descriptor) => {
                self.state.begin_resolution();
                self.state.replace_session(descriptor);
                None
            }
            Effect::ReloadPlayer {
                manifest_url,
                preserve_live_offset,
            } => {
                if let Err(e) = self.reload(&manifest_url, preserve_live_offset) {
                    tracing::debug!(error = %e, "Ignoring reload with invalid manifest URL");
                }
                None
            }
        }
    }

    fn spawn_resolution(&self, media_url: String, use_init_protocol: bool) -> ResolutionHandle {
        let generation = self.state.begin_resolution();
        let resolver = self.resolver.clone();
        let state = self.state.clone();

        tracing::info!(
            generation = generation,
            media_url = %media_url,
            use_init_protocol = use_init_protocol,
            "Resolving session"
        );

        tokio::spawn(async move {
            match resolver.resolve(&media_url, use_init_protocol).await {
                Ok(descriptor) => {
                    if state.replace_session_if_current(generation, descriptor.clone()) {
                        ResolutionOutcome::Applied(descriptor)
                    } else {
                        tracing::debug!(
                            generation = generation,
                            latest = state.latest_generation(),
                            media_url = %media_url,
                            "Discarding superseded resolution"
                        );
                        ResolutionOutcome::Superseded
                    }
                }
                Err(failure) => {
                    tracing::warn!(
                        generation = generation,
                        error = %failure,
                        "Session resolution failed, keeping previous session"
                    );
                    ResolutionOutcome::Failed(failure)
                }
            }
        })
    }

    // ========== Player ==========

    /// 用新的清单 URL 重新配置播放器
    ///
    /// 取消当前插播事件（偏移归零），以新条目替换当前条目；不保证播放位置延续
    pub fn reload(&self, manifest_url: &str, preserve_live_offset: bool) -> Result<(), ApplicationError> {
        Url::parse(manifest_url).map_err(|e| {
            ApplicationError::validation(format!("Invalid manifest URL '{}': {}", manifest_url, e))
        })?;

        self.player.cancel_current_event(0.0);
        self.player.replace_current_item(PlayerItem {
            url: manifest_url.to_string(),
            automatically_preserves_time_offset_from_live: preserve_live_offset,
        });

        self.sink.log(
            &format!("Reloaded player with {}", manifest_url),
            LOG_SOURCE,
            LogLevel::Info,
        );
        Ok(())
    }

    // ========== Playhead ==========

    /// 处理播放器位置采样（同步）
    ///
    /// 决策只应用到追踪器绑定的会话；期间发生的会话替换会让本次采样失效
    pub fn observe_playhead(&self, sample: PlayheadSample) {
        let session_id = self.state.current_session_id();
        let mut tracker = self.tracker.lock().unwrap_or_else(PoisonError::into_inner);
        tracker.bind_session(&session_id);
        let decision = self
            .state
            .with_watched_ranges(|watched| tracker.observe(sample, watched));
        self.state.apply_playhead(&session_id, decision);
    }

    pub fn latest_playhead(&self) -> Option<f64> {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest_playhead()
    }

    // ========== Pass-through ==========

    pub fn set_custom_headers(&self, headers: HashMap<String, String>) {
        self.state.set_custom_headers(headers);
    }

    pub fn set_ad_pods(&self, ad_pods: Vec<AdBreak>) {
        self.state.set_ad_pods(ad_pods);
    }

    pub fn set_debug_overlay_visible(&self, visible: bool) {
        self.state.set_debug_overlay_visible(visible);
    }

    pub fn set_player_control_focused(&self, focused: bool) {
        self.state.set_player_control_focused(focused);
    }

    /// 宿主写入诊断日志
    pub fn log(&self, message: &str, source: &str, level: LogLevel) {
        self.sink.log(message, source, level);
    }
}
