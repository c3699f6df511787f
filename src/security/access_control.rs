//! Access policies for caller-supplied targets.
//!
//! Two routes act on locations chosen by the client: the download route
//! fetches an arbitrary URL and the image route reads an arbitrary path.
//! Each gets a policy object built once from config.

use std::path::{Path, PathBuf};
use url::Url;

use crate::config::{DownloadConfig, ImageConfig};
use crate::http::response::ProxyError;

/// Host allow-list for the download route.
///
/// An empty list permits every host.
#[derive(Debug, Clone, Default)]
pub struct HostPolicy {
    allowed: Vec<String>,
}

impl HostPolicy {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            allowed: config
                .allowed_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    /// True when every host is permitted.
    pub fn is_permissive(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Check a download target against the allow-list.
    pub fn check(&self, target: &Url) -> Result<(), ProxyError> {
        if self.is_permissive() {
            return Ok(());
        }
        let host = target.host_str().map(str::to_ascii_lowercase);
        match host {
            Some(host) if self.allowed.iter().any(|h| *h == host) => Ok(()),
            _ => Err(ProxyError::HostNotAllowed),
        }
    }
}

/// Containment root for the image route.
#[derive(Debug, Clone, Default)]
pub struct ImageRoot {
    root: Option<PathBuf>,
}

impl ImageRoot {
    /// Canonicalize the configured root, if any.
    pub fn new(config: &ImageConfig) -> Result<Self, std::io::Error> {
        let root = match &config.root {
            Some(root) => Some(std::fs::canonicalize(root)?),
            None => None,
        };
        Ok(Self { root })
    }

    /// True when any readable path may be served.
    pub fn is_unrestricted(&self) -> bool {
        self.root.is_none()
    }

    /// Resolve a requested path, rejecting anything outside the root.
    ///
    /// Symlinks and `..` are resolved before the prefix check.
    pub async fn resolve(&self, requested: &Path) -> Result<PathBuf, ProxyError> {
        let Some(root) = &self.root else {
            return Ok(requested.to_path_buf());
        };

        let resolved = tokio::fs::canonicalize(requested)
            .await
            .map_err(|_| ProxyError::ImageNotFound)?;

        if resolved.starts_with(root) {
            Ok(resolved)
        } else {
            tracing::warn!(path = %requested.display(), "Image path escapes configured root");
            Err(ProxyError::ImageOutsideRoot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn empty_allow_list_permits_everything() {
        let policy = HostPolicy::new(&DownloadConfig::default());
        assert!(policy.is_permissive());
        assert!(policy.check(&url("https://anything.example/x")).is_ok());
    }

    #[test]
    fn allow_list_matches_case_insensitively() {
        let policy = HostPolicy::new(&DownloadConfig {
            allowed_hosts: vec!["Storage.GoogleAPIs.com".into()],
        });
        assert!(policy.check(&url("https://storage.googleapis.com/bucket/v.mp4")).is_ok());
        assert!(matches!(
            policy.check(&url("https://evil.example/v.mp4")),
            Err(ProxyError::HostNotAllowed)
        ));
    }

    #[tokio::test]
    async fn unrestricted_root_passes_path_through() {
        let root = ImageRoot::new(&ImageConfig::default()).unwrap();
        assert!(root.is_unrestricted());
        let resolved = root.resolve(Path::new("/tmp/whatever.png")).await.unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/whatever.png"));
    }

    #[tokio::test]
    async fn root_contains_children_and_rejects_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir(&images).unwrap();
        std::fs::write(images.join("a.png"), b"png").unwrap();
        std::fs::write(dir.path().join("secret.png"), b"nope").unwrap();

        let root = ImageRoot::new(&ImageConfig {
            root: Some(images.clone()),
        })
        .unwrap();

        assert!(root.resolve(&images.join("a.png")).await.is_ok());
        assert!(matches!(
            root.resolve(&images.join("../secret.png")).await,
            Err(ProxyError::ImageOutsideRoot)
        ));
        assert!(matches!(
            root.resolve(&images.join("missing.png")).await,
            Err(ProxyError::ImageNotFound)
        ));
    }
}
