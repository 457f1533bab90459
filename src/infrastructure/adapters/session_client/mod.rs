//! Session Client Adapters

mod fake_session_client;
mod http_session_client;

pub use fake_session_client::FakeSessionClient;
pub use http_session_client::{HttpSessionClient, HttpSessionClientConfig};
