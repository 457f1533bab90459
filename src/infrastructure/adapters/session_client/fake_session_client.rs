//! Fake Session Client - 用于测试的会话解析客户端
//!
//! 按 URL 返回预设的响应，可为每个 URL 配置延迟以模拟慢请求

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::application::ports::{FetchResponse, InitResponse, SessionClientPort, TransportError};

/// Fake Session Client
#[derive(Default)]
pub struct FakeSessionClient {
    init_responses: Mutex<HashMap<String, Result<InitResponse, TransportError>>>,
    get_responses: Mutex<HashMap<String, Result<Option<String>, TransportError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    init_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl FakeSessionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预设 POST init 响应
    pub fn on_init(&self, url: &str, response: Result<InitResponse, TransportError>) {
        self.init_responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), response);
    }

    /// 预设 GET 响应，`Ok(Some(..))` 表示重定向后的最终 URL
    pub fn on_get(&self, url: &str, response: Result<Option<String>, TransportError>) {
        self.get_responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), response);
    }

    /// 对该 URL 的每个请求先等待一段时间
    pub fn with_delay(&self, url: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), delay);
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    async fn delay_for(&self, url: &str) {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn unscripted(url: &str) -> TransportError {
        TransportError::NetworkError(format!("No scripted response for {}", url))
    }
}

#[async_trait]
impl SessionClientPort for FakeSessionClient {
    async fn make_init_request(&self, url: &str) -> Result<InitResponse, TransportError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.delay_for(url).await;

        tracing::debug!(url = %url, "FakeSessionClient: init request");

        self.init_responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Self::unscripted(url)))
    }

    async fn make_request(&self, url: &str) -> Result<FetchResponse, TransportError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.delay_for(url).await;

        tracing::debug!(url = %url, "FakeSessionClient: GET request");

        self.get_responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Self::unscripted(url)))
            .map(|final_url| FetchResponse { final_url })
    }
}
