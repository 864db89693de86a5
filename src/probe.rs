//! Existence probes for candidate URLs.
//!
//! The [`Prober`] trait is the only thing the resolver knows about the
//! outside world. Two implementations ship:
//!
//! | Prober | Checks | Used by |
//! |--------|--------|---------|
//! | [`HttpProber`] | `HEAD` request against the live site | `resolve --base-url` |
//! | [`FsProber`] | file lookup inside a built site directory | `resolve --site`, `check` |
//!
//! Candidate URLs are relative to the current page (or absolute from the
//! site root), exactly as they would appear in an `href`. Timeouts are not
//! the prober's concern; the resolver bounds every probe.

use crate::resolve::PageLocation;
use reqwest::Url;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("invalid URL {0:?}: {1}")]
    InvalidUrl(String, String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreachable: {0}")]
    Unreachable(String),
}

/// A lightweight existence check.
#[allow(async_fn_in_trait)]
pub trait Prober {
    /// Whether `url` exists. `Ok(false)` is a definite miss (e.g. 404);
    /// `Err` is a failed check. Both count as a failed candidate.
    async fn probe(&self, url: &str) -> Result<bool, ProbeError>;
}

/// Probes a live site with `HEAD` requests.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    page_url: Url,
}

impl HttpProber {
    /// `page_url` is the full URL of the current page; candidates are
    /// joined onto it the way a browser resolves an `href`.
    pub fn new(page_url: Url) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, page_url })
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }
}

impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError> {
        let full = self
            .page_url
            .join(url)
            .map_err(|e| ProbeError::InvalidUrl(url.to_string(), e.to_string()))?;
        let response = self.client.head(full).send().await?;
        Ok(response.status().is_success())
    }
}

/// Probes a built site on disk, as a static file server would serve it.
#[derive(Debug, Clone)]
pub struct FsProber {
    root: PathBuf,
    page_folders: Vec<String>,
}

impl FsProber {
    pub fn new(root: impl Into<PathBuf>, location: &PageLocation) -> Self {
        Self {
            root: root.into(),
            page_folders: location.folders().to_vec(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a candidate URL to a file under the site root.
    ///
    /// `..` at the root stays at the root, matching how browsers normalize
    /// URL paths. URLs with a scheme cannot be checked on disk.
    pub fn site_path(&self, url: &str) -> Option<PathBuf> {
        if url.contains("://") || url.starts_with("//") {
            return None;
        }
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let mut segments: Vec<&str> = if path.starts_with('/') {
            Vec::new()
        } else {
            self.page_folders.iter().map(String::as_str).collect()
        };
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        let mut full = self.root.clone();
        full.extend(segments);
        Some(full)
    }
}

impl Prober for FsProber {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError> {
        let Some(path) = self.site_path(url) else {
            return Ok(false);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(true),
            Ok(meta) if meta.is_dir() => Ok(tokio::fs::metadata(path.join("index.html"))
                .await
                .is_ok_and(|m| m.is_file())),
            Ok(_) => Ok(false),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for file in [
            "index.html",
            "about/mission.html",
            "program/calendar.html",
            "program/exhibition.html",
            "gallery/index.html",
        ] {
            let path = tmp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<html></html>").unwrap();
        }
        tmp
    }

    #[test]
    fn site_path_relative_to_page_folder() {
        let prober = FsProber::new("/site", &PageLocation::new("/program/calendar.html"));
        assert_eq!(
            prober.site_path("exhibition.html"),
            Some(PathBuf::from("/site/program/exhibition.html"))
        );
        assert_eq!(
            prober.site_path("../about/mission.html"),
            Some(PathBuf::from("/site/about/mission.html"))
        );
        assert_eq!(
            prober.site_path("/about/mission.html"),
            Some(PathBuf::from("/site/about/mission.html"))
        );
    }

    #[test]
    fn site_path_clamps_at_root() {
        let prober = FsProber::new("/site", &PageLocation::new("/program/calendar.html"));
        assert_eq!(
            prober.site_path("../../../index.html"),
            Some(PathBuf::from("/site/index.html"))
        );
    }

    #[test]
    fn site_path_ignores_query_and_fragment() {
        let prober = FsProber::new("/site", &PageLocation::new("/index.html"));
        assert_eq!(
            prober.site_path("about/mission.html#team"),
            Some(PathBuf::from("/site/about/mission.html"))
        );
    }

    #[test]
    fn site_path_rejects_external_urls() {
        let prober = FsProber::new("/site", &PageLocation::new("/index.html"));
        assert_eq!(prober.site_path("https://example.org/a.html"), None);
    }

    #[tokio::test]
    async fn fs_probe_finds_files() {
        let tmp = site();
        let prober = FsProber::new(tmp.path(), &PageLocation::new("/program/calendar.html"));
        assert!(prober.probe("../about/mission.html").await.unwrap());
        assert!(prober.probe("exhibition.html").await.unwrap());
        assert!(!prober.probe("about/mission.html").await.unwrap());
    }

    #[tokio::test]
    async fn fs_probe_directory_needs_index() {
        let tmp = site();
        let prober = FsProber::new(tmp.path(), &PageLocation::new("/index.html"));
        assert!(prober.probe("gallery/").await.unwrap());
        assert!(!prober.probe("about/").await.unwrap());
    }

    #[test]
    fn http_prober_keeps_page_url() {
        let url = Url::parse("https://example.org/program/calendar.html").unwrap();
        let prober = HttpProber::new(url.clone()).unwrap();
        assert_eq!(prober.page_url(), &url);
    }
}
