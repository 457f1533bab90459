//! 元数据 URL 推导规则

use url::Url;

/// 清单文件扩展名
const MANIFEST_EXTENSIONS: &[&str] = &[".m3u8", ".mpd"];

/// 将清单 URL 改写为广告追踪元数据 URL
///
/// 最后一个路径段为清单文件（`*.m3u8` / `*.mpd`）时替换为 `metadata`，保留查询参数；
/// 其他 URL 原样返回
pub fn rewrite_to_metadata_url(manifest_url: &str) -> String {
    let Ok(mut url) = Url::parse(manifest_url) else {
        return manifest_url.to_string();
    };

    let is_manifest = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|last| MANIFEST_EXTENSIONS.iter().any(|ext| last.ends_with(ext)))
        .unwrap_or(false);
    if !is_manifest {
        return manifest_url.to_string();
    }

    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop().push("metadata");
        }
        Err(()) => return manifest_url.to_string(),
    }
    url.to_string()
}
