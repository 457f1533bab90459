//! Session Resolver - 会话解析协议
//!
//! 1. POST init（可选）：服务端直接返回规范的清单 URL 与追踪 URL
//! 2. GET 回退：跟随重定向，以最终 URL 作为清单 URL，并推导元数据 URL

use std::sync::Arc;

use crate::application::error::ResolutionFailure;
use crate::application::ports::{
    DiagnosticSinkPort, MetadataUrlRewriterPort, SessionClientPort,
};
use crate::domain::session::{LogLevel, SessionDescriptor};

const LOG_SOURCE: &str = "SessionResolver";

/// 会话解析器
pub struct SessionResolver {
    client: Arc<dyn SessionClientPort>,
    rewriter: Arc<dyn MetadataUrlRewriterPort>,
    sink: Arc<dyn DiagnosticSinkPort>,
}

impl SessionResolver {
    pub fn new(
        client: Arc<dyn SessionClientPort>,
        rewriter: Arc<dyn MetadataUrlRewriterPort>,
        sink: Arc<dyn DiagnosticSinkPort>,
    ) -> Self {
        Self {
            client,
            rewriter,
            sink,
        }
    }

    /// 解析媒体 URL，成功时返回带新会话 ID 的描述符
    pub async fn resolve(
        &self,
        media_url: &str,
        use_init_protocol: bool,
    ) -> Result<SessionDescriptor, ResolutionFailure> {
        let mut init_error = None;

        if use_init_protocol {
            match self.client.make_init_request(media_url).await {
                Ok(response) => {
                    self.sink.log(
                        &format!(
                            "Parsed URLs from POST init request: {}, {}",
                            response.manifest_url, response.tracking_url
                        ),
                        LOG_SOURCE,
                        LogLevel::Info,
                    );
                    return Ok(SessionDescriptor::new(
                        media_url,
                        response.manifest_url,
                        response.tracking_url,
                    ));
                }
                Err(e) => {
                    self.sink.log(
                        &format!(
                            "Failed to make POST request to {} to initialise the session: {}. \
                             Falling back to GET request.",
                            media_url, e
                        ),
                        LOG_SOURCE,
                        LogLevel::Warning,
                    );
                    init_error = Some(e);
                }
            }
        }

        match self.client.make_request(media_url).await {
            Ok(response) => {
                let manifest_url = response
                    .final_url
                    .unwrap_or_else(|| media_url.to_string());
                let metadata_url = self.rewriter.rewrite(&manifest_url);

                tracing::debug!(
                    media_url = %media_url,
                    manifest_url = %manifest_url,
                    metadata_url = %metadata_url,
                    "Session resolved via GET"
                );

                Ok(SessionDescriptor::new(media_url, manifest_url, metadata_url))
            }
            Err(e) => {
                self.sink.log(
                    &format!("Failed to load media with URL: {}; Error: {}", media_url, e),
                    LOG_SOURCE,
                    LogLevel::Warning,
                );
                Err(ResolutionFailure {
                    media_url: media_url.to_string(),
                    init_error,
                    source: e,
                })
            }
        }
    }
}
