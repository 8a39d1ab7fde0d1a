//! Static file serving
//!
//! Maps request paths onto files under a fixed root. Anything that could
//! step outside the root is treated as missing.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

/// Document served for `/`
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Fallback content type for unrecognized extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A file loaded from the asset root
#[derive(Debug, Clone)]
pub struct StaticAsset {
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Resolve a request path against `root`
///
/// Returns `None` for paths with `..`, `.` or absolute components.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        DEFAULT_DOCUMENT
    } else {
        relative
    };

    let mut resolved = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => resolved.push(part),
            _ => return None,
        }
    }

    Some(resolved)
}

/// Content type for a file, by extension
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=UTF-8",
        Some("js") => "application/javascript; charset=UTF-8",
        Some("css") => "text/css; charset=UTF-8",
        _ => OCTET_STREAM,
    }
}

/// Load the asset for `request_path`, or `None` if it is missing, a
/// directory, or outside the root
pub async fn load(root: &Path, request_path: &str) -> Option<StaticAsset> {
    let path = resolve(root, request_path)?;

    let metadata = tokio::fs::metadata(&path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => Some(StaticAsset {
            content_type: content_type(&path),
            bytes: Bytes::from(bytes),
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read asset");
            None
        }
    }
}
