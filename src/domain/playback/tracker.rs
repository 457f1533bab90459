//! Playhead Tracker - 播放头追踪
//!
//! 根据播放器位置采样累积已观看区间，并检测 seek 造成的越界播放。
//! 追踪器本身不持有区间集合，只产出 `PlayheadDecision`，由 SessionState 应用

use std::time::Instant;

use super::data_range::{DataRange, WatchedRanges};
use crate::domain::session::LocalSessionId;

/// 默认连续性容差（秒）
pub const DEFAULT_TOLERANCE_SECS: f64 = 1.0;

/// 播放器位置采样
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayheadSample {
    /// 播放位置（秒）
    pub position: f64,
    pub is_playing: bool,
    /// 采样时刻（宿主单调时钟）
    pub observed_at: Instant,
}

impl PlayheadSample {
    /// 以当前时刻采样
    pub fn now(position: f64, is_playing: bool) -> Self {
        Self::at(position, is_playing, Instant::now())
    }

    pub fn at(position: f64, is_playing: bool, observed_at: Instant) -> Self {
        Self {
            position,
            is_playing,
            observed_at,
        }
    }
}

/// 越界播放事件的变化
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutOfRangeChange {
    /// 在跳转目标处新开一个事件
    Open(DataRange),
    /// 延长当前打开的事件到给定位置
    Extend(f64),
}

/// 单次采样的处理结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayheadDecision {
    /// 需要并入 WatchedRanges 的区间
    pub merge: Option<DataRange>,
    pub out_of_range: Option<OutOfRangeChange>,
}

/// 播放头追踪器
#[derive(Debug, Clone)]
pub struct PlayheadTracker {
    tolerance_secs: f64,
    session_id: Option<LocalSessionId>,
    last: Option<PlayheadSample>,
    out_of_range_open: bool,
}

impl Default for PlayheadTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_SECS)
    }
}

impl PlayheadTracker {
    pub fn new(tolerance_secs: f64) -> Self {
        Self {
            tolerance_secs,
            session_id: None,
            last: None,
            out_of_range_open: false,
        }
    }

    pub fn latest_playhead(&self) -> Option<f64> {
        self.last.map(|s| s.position)
    }

    /// 丢弃连续性状态
    pub fn reset(&mut self) {
        self.last = None;
        self.out_of_range_open = false;
    }

    /// 绑定当前会话；会话变化时重置
    pub fn bind_session(&mut self, session_id: &LocalSessionId) {
        if self.session_id.as_ref() != Some(session_id) {
            if self.session_id.is_some() {
                tracing::debug!(session_id = %session_id, "Session changed, resetting playhead tracker");
            }
            self.reset();
            self.session_id = Some(session_id.clone());
        }
    }

    /// 处理一次采样
    ///
    /// `latest_playhead` 无论是否连续都会更新
    pub fn observe(&mut self, sample: PlayheadSample, watched: &WatchedRanges) -> PlayheadDecision {
        let previous = self.last.replace(sample);
        let mut decision = PlayheadDecision::default();

        if !sample.is_playing {
            self.out_of_range_open = false;
            return decision;
        }

        let Some(previous) = previous else {
            decision.merge = Some(DataRange::point(sample.position));
            return decision;
        };

        if self.is_continuous(&previous, &sample) {
            decision.merge = Some(DataRange::new(previous.position, sample.position));
            if self.out_of_range_open {
                decision.out_of_range = Some(OutOfRangeChange::Extend(sample.position));
            }
            return decision;
        }

        tracing::debug!(
            from = previous.position,
            to = sample.position,
            "Playhead discontinuity detected"
        );

        self.out_of_range_open = false;
        if !watched.contains(sample.position) {
            decision.out_of_range = Some(OutOfRangeChange::Open(DataRange::point(sample.position)));
            self.out_of_range_open = true;
        }
        decision
    }

    fn is_continuous(&self, previous: &PlayheadSample, sample: &PlayheadSample) -> bool {
        let advanced = sample.position - previous.position;
        let expected = if previous.is_playing {
            sample
                .observed_at
                .saturating_duration_since(previous.observed_at)
                .as_secs_f64()
        } else {
            0.0
        };
        (advanced - expected).abs() <= self.tolerance_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// 测试用：把决策应用到本地集合
    struct Harness {
        tracker: PlayheadTracker,
        watched: WatchedRanges,
        out_of_range: Vec<DataRange>,
        origin: Instant,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                tracker: PlayheadTracker::default(),
                watched: WatchedRanges::new(),
                out_of_range: Vec::new(),
                origin: Instant::now(),
            }
        }

        /// 在宿主时刻 `at` 秒处采样
        fn observe(&mut self, at: f64, position: f64, is_playing: bool) -> PlayheadDecision {
            let sample = PlayheadSample::at(
                position,
                is_playing,
                self.origin + Duration::from_secs_f64(at),
            );
            let decision = self.tracker.observe(sample, &self.watched);
            if let Some(range) = decision.merge {
                self.watched.insert(range);
            }
            match decision.out_of_range {
                Some(OutOfRangeChange::Open(range)) => self.out_of_range.push(range),
                Some(OutOfRangeChange::Extend(end)) => {
                    if let Some(last) = self.out_of_range.last_mut() {
                        last.end = last.end.max(end);
                    }
                }
                None => {}
            }
            decision
        }
    }

    #[test]
    fn test_continuous_playback_yields_single_range() {
        let mut h = Harness::new();
        for i in 0..=10 {
            h.observe(i as f64, 5.0 + i as f64, true);
        }
        assert_eq!(h.watched.ranges(), &[DataRange::new(5.0, 15.0)]);
        assert!(h.out_of_range.is_empty());
    }

    #[test]
    fn test_seek_backward_splits_ranges() {
        let mut h = Harness::new();
        for i in 0..=10 {
            h.observe(i as f64, 10.0 + i as f64, true);
        }
        for i in 0..=5 {
            h.observe(11.0 + i as f64, i as f64, true);
        }
        assert_eq!(
            h.watched.ranges(),
            &[DataRange::new(0.0, 5.0), DataRange::new(10.0, 20.0)]
        );
    }

    #[test]
    fn test_jump_forward_records_out_of_range() {
        let mut h = Harness::new();
        h.observe(0.0, 10.0, true);
        h.observe(2.0, 12.0, true);
        let decision = h.observe(3.0, 50.0, true);

        assert_eq!(h.watched.ranges(), &[DataRange::new(10.0, 12.0)]);
        assert_eq!(
            decision.out_of_range,
            Some(OutOfRangeChange::Open(DataRange::point(50.0)))
        );
        assert_eq!(h.out_of_range.len(), 1);
        assert_eq!(h.out_of_range[0].start, 50.0);
        assert_eq!(h.tracker.latest_playhead(), Some(50.0));
    }

    #[test]
    fn test_out_of_range_extends_until_pause() {
        let mut h = Harness::new();
        h.observe(0.0, 10.0, true);
        h.observe(1.0, 11.0, true);
        h.observe(2.0, 50.0, true);
        h.observe(3.0, 51.0, true);
        h.observe(4.0, 52.0, true);
        h.observe(5.0, 52.0, false);
        h.observe(6.0, 52.5, true);

        assert_eq!(h.out_of_range, vec![DataRange::new(50.0, 52.0)]);
        assert_eq!(
            h.watched.ranges(),
            &[DataRange::new(10.0, 11.0), DataRange::new(50.0, 52.5)]
        );
    }

    #[test]
    fn test_seek_into_watched_range_is_not_out_of_range() {
        let mut h = Harness::new();
        for i in 0..=10 {
            h.observe(i as f64, i as f64, true);
        }
        let decision = h.observe(11.0, 3.0, true);
        assert_eq!(decision, PlayheadDecision::default());
        assert!(h.out_of_range.is_empty());
        assert_eq!(h.watched.len(), 1);
    }

    #[test]
    fn test_paused_samples_do_not_merge() {
        let mut h = Harness::new();
        h.observe(0.0, 10.0, false);
        h.observe(5.0, 10.0, false);
        assert!(h.watched.is_empty());
        assert_eq!(h.tracker.latest_playhead(), Some(10.0));

        // 暂停后恢复，墙钟流逝不算跳转
        h.observe(6.0, 10.5, true);
        assert_eq!(h.watched.ranges(), &[DataRange::new(10.0, 10.5)]);
    }

    #[test]
    fn test_bind_session_resets_continuity() {
        let mut h = Harness::new();
        h.tracker.bind_session(&LocalSessionId::generate());
        h.observe(0.0, 10.0, true);
        assert_eq!(h.tracker.latest_playhead(), Some(10.0));

        h.tracker.bind_session(&LocalSessionId::generate());
        assert_eq!(h.tracker.latest_playhead(), None);
    }
}
