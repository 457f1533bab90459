//! Reactive Bindings - 触发规则表
//!
//! | 触发 | 前置条件 | 效果 |
//! |---|---|---|
//! | `MediaUrlSet(非空)` | 无 | 解析会话 |
//! | `IsInitRequestSet` 值变化 | media_url 已设置 | 用新协议重新解析 |
//! | `MetadataTypeSet` 值变化 | 会话已有 manifest_url | 重新加载播放器，不重新解析 |
//! | `PreserveLiveOffsetSet` | 无 | 仅记录 |
//! | `SessionInfoSet` | 无 | 同步整体替换会话 |
//!
//! 规则求值是纯函数：输入当前绑定和会话，输出效果列表，由协调器执行

use crate::application::session_state::SessionSettings;
use crate::domain::session::{MetadataType, SessionConfig, SessionDescriptor};

/// 外部触发
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    MediaUrlSet(String),
    IsInitRequestSet(bool),
    MetadataTypeSet(MetadataType),
    PreserveLiveOffsetSet(bool),
    SessionInfoSet {
        manifest_url: String,
        ad_tracking_metadata_url: String,
        media_url: String,
    },
}

/// 规则求值产生的效果
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Resolve {
        media_url: String,
        use_init_protocol: bool,
    },
    ReplaceSession(SessionDescriptor),
    ReloadPlayer {
        manifest_url: String,
        preserve_live_offset: bool,
    },
}

/// 绑定的当前取值
#[derive(Debug, Clone)]
pub struct Bindings {
    media_url: String,
    is_init_request: bool,
    metadata_type: MetadataType,
    preserve_live_offset: bool,
}

impl Bindings {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            media_url: String::new(),
            is_init_request: config.is_init_request,
            metadata_type: config.metadata_type,
            preserve_live_offset: config.automatically_preserves_time_offset_from_live,
        }
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn is_init_request(&self) -> bool {
        self.is_init_request
    }

    pub fn metadata_type(&self) -> MetadataType {
        self.metadata_type
    }

    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            media_url: self.media_url.clone(),
            is_init_request: self.is_init_request,
            automatically_preserves_time_offset_from_live: self.preserve_live_offset,
            metadata_type: self.metadata_type,
        }
    }

    /// 按规则表求值
    pub fn evaluate(&mut self, trigger: Trigger, current: &SessionDescriptor) -> Vec<Effect> {
        match trigger {
            Trigger::MediaUrlSet(media_url) => {
                self.media_url = media_url;
                self.resolve_effect().into_iter().collect()
            }
            Trigger::IsInitRequestSet(enabled) => {
                if self.is_init_request == enabled {
                    return Vec::new();
                }
                self.is_init_request = enabled;
                self.resolve_effect().into_iter().collect()
            }
            Trigger::MetadataTypeSet(metadata_type) => {
                if self.metadata_type == metadata_type {
                    return Vec::new();
                }
                self.metadata_type = metadata_type;
                if current.manifest_url().is_empty() {
                    return Vec::new();
                }
                vec![Effect::ReloadPlayer {
                    manifest_url: current.manifest_url().to_string(),
                    preserve_live_offset: self.preserve_live_offset,
                }]
            }
            Trigger::PreserveLiveOffsetSet(enabled) => {
                self.preserve_live_offset = enabled;
                Vec::new()
            }
            Trigger::SessionInfoSet {
                manifest_url,
                ad_tracking_metadata_url,
                media_url,
            } => vec![Effect::ReplaceSession(SessionDescriptor::new(
                media_url,
                manifest_url,
                ad_tracking_metadata_url,
            ))],
        }
    }

    /// 空 media_url 不解析
    fn resolve_effect(&self) -> Option<Effect> {
        if self.media_url.is_empty() {
            return None;
        }
        Some(Effect::Resolve {
            media_url: self.media_url.clone(),
            use_init_protocol: self.is_init_request,
        })
    }
}
