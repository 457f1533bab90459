//! Memory Layer - In-Memory State Management
//!
//! 实现 PlayerPort，在没有真实播放器时保存当前播放条目

mod player;

pub use player::InMemoryPlayer;
