//! HTTP Session Client - 通过 HTTP 解析会话
//!
//! 实现 SessionClientPort trait
//!
//! 外部 API:
//! POST {media_url}?initSession=true
//! Request: {}  (JSON)
//! Response: {"manifestUrl": "...", "trackingUrl": "..."}  (相对或绝对 URL)
//!
//! GET {media_url}，跟随重定向，取最终 URL

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::application::ports::{FetchResponse, InitResponse, SessionClientPort, TransportError};

/// POST init 响应体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitHttpResponse {
    manifest_url: String,
    tracking_url: String,
}

/// HTTP 会话客户端配置
#[derive(Debug, Clone)]
pub struct HttpSessionClientConfig {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 最大重定向次数
    pub max_redirects: usize,
}

impl Default for HttpSessionClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// HTTP 会话客户端
pub struct HttpSessionClient {
    client: Client,
}

impl HttpSessionClient {
    /// 创建新的 HTTP 会话客户端
    pub fn new(config: HttpSessionClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| TransportError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }
}

/// 拼接 `initSession=true` 查询参数
fn init_url(media_url: &str) -> Result<Url, TransportError> {
    let mut url =
        Url::parse(media_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", media_url, e)))?;
    url.query_pairs_mut().append_pair("initSession", "true");
    Ok(url)
}

/// 将响应中的 URL 解析为绝对 URL
fn absolutize(base: &Url, value: &str) -> Result<String, TransportError> {
    base.join(value)
        .map(|u| u.to_string())
        .map_err(|e| TransportError::InvalidResponse(format!("Bad URL '{}': {}", value, e)))
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::NetworkError(format!("Cannot connect: {}", e))
    } else {
        TransportError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl SessionClientPort for HttpSessionClient {
    async fn make_init_request(&self, url: &str) -> Result<InitResponse, TransportError> {
        let request_url = init_url(url)?;

        tracing::debug!(url = %request_url, "Sending session init request");

        let response = self
            .client
            .post(request_url.clone())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: InitHttpResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(format!("Failed to parse init response: {}", e)))?;

        Ok(InitResponse {
            manifest_url: absolutize(&request_url, &body.manifest_url)?,
            tracking_url: absolutize(&request_url, &body.tracking_url)?,
        })
    }

    async fn make_request(&self, url: &str) -> Result<FetchResponse, TransportError> {
        tracing::debug!(url = %url, "Sending media GET request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        tracing::debug!(url = %url, final_url = %final_url, "Media GET completed");

        Ok(FetchResponse {
            final_url: Some(final_url),
        })
    }
}
