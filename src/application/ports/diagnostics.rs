//! Diagnostic Ports - 诊断日志与元数据 URL 推导

use crate::domain::session::LogLevel;

/// 诊断日志出口（fire-and-forget）
pub trait DiagnosticSinkPort: Send + Sync {
    fn log(&self, message: &str, source: &str, level: LogLevel);
}

/// 元数据 URL 推导规则（纯函数）
pub trait MetadataUrlRewriterPort: Send + Sync {
    fn rewrite(&self, manifest_url: &str) -> String;
}

impl<F> MetadataUrlRewriterPort for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn rewrite(&self, manifest_url: &str) -> String {
        self(manifest_url)
    }
}
