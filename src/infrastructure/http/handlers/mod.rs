//! HTTP Handlers

mod ping;
mod player;
mod session;
mod websocket;

pub use ping::*;
pub use player::*;
pub use session::*;
pub use websocket::*;
