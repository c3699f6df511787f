//! Local image serving for `GET /image?path=...`.

use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::path::Path;

use crate::http::response::ProxyError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub path: Option<String>,
}

/// Media type for a supported image extension.
pub fn media_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Handler for `GET /image?path=...`.
///
/// The extension is checked before the filesystem is touched, so an
/// unsupported path is rejected with 400 whether or not it exists.
pub async fn serve_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ProxyError> {
    let requested = query
        .path
        .filter(|p| !p.is_empty())
        .ok_or(ProxyError::MissingImagePath)?;
    let requested = Path::new(&requested);

    let media_type = media_type(requested).ok_or(ProxyError::UnsupportedImageFormat)?;
    let path = state.image_root.resolve(requested).await?;

    let data = tokio::fs::read(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
        ProxyError::ImageNotFound
    })?;

    Ok(([(CONTENT_TYPE, media_type)], data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions() {
        assert_eq!(media_type(Path::new("/a/b.jpg")), Some("image/jpeg"));
        assert_eq!(media_type(Path::new("/a/b.JPEG")), Some("image/jpeg"));
        assert_eq!(media_type(Path::new("/a/b.png")), Some("image/png"));
    }

    #[test]
    fn unsupported_extensions() {
        assert_eq!(media_type(Path::new("/a/b.gif")), None);
        assert_eq!(media_type(Path::new("/a/png")), None);
        assert_eq!(media_type(Path::new("/a/.png")), None);
    }
}
