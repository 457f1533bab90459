//! Playback Context - 播放进度上下文

mod data_range;
mod tracker;

pub use data_range::{DataRange, WatchedRanges};
pub use tracker::{OutOfRangeChange, PlayheadDecision, PlayheadSample, PlayheadTracker};
