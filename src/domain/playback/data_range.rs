//! Playback Context - 已观看区间

use serde::{Deserialize, Serialize};

/// 一段连续的播放时间区间（秒）
///
/// 不变量: end >= start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub start: f64,
    pub end: f64,
}

impl DataRange {
    /// 创建区间，端点顺序颠倒时自动交换
    pub fn new(start: f64, end: f64) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// 单点区间 [t, t]
    pub fn point(t: f64) -> Self {
        Self { start: t, end: t }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// 相交或首尾相接
    fn touches(&self, other: &DataRange) -> bool {
        other.start <= self.end && self.start <= other.end
    }

    fn union(&self, other: &DataRange) -> DataRange {
        DataRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// 已观看区间集合
///
/// 不变量: 按 start 升序，任意两区间严格分离（A.end < B.start），相接的区间会被合并
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchedRanges {
    ranges: Vec<DataRange>,
}

impl WatchedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &[DataRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// t 是否落在某个已观看区间内
    pub fn contains(&self, t: f64) -> bool {
        self.range_containing(t).is_some()
    }

    pub fn range_containing(&self, t: f64) -> Option<DataRange> {
        self.ranges.iter().copied().find(|r| r.contains(t))
    }

    /// 已观看总时长
    pub fn total_duration(&self) -> f64 {
        self.ranges.iter().map(DataRange::duration).sum()
    }

    /// 合并一个区间，返回合并后包含它的区间
    pub fn insert(&mut self, range: DataRange) -> DataRange {
        let mut merged = range;
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);

        for existing in self.ranges.drain(..) {
            if merged.touches(&existing) {
                merged = merged.union(&existing);
            } else {
                kept.push(existing);
            }
        }

        let index = kept.partition_point(|r| r.start < merged.start);
        kept.insert(index, merged);
        self.ranges = kept;
        merged
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}
