//! Site checker: resolve every menu link from every page of a built site.
//!
//! The menu is shared by all pages but its targets are relative, so a link
//! that works from `/index.html` can be dead from `/program/calendar.html`.
//! The checker walks the site directory, and for each HTML page runs the
//! same resolver the browser uses, probing the filesystem instead of HTTP.
//! Content documents are parsed too, so a broken JSON file shows up before
//! a visitor sees the error row.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{ContentSource, FsSource, fetch_json};
use crate::menu::load_menu;
use crate::probe::FsProber;
use crate::resolve::{PageLocation, Resolution, ResolveOptions, Resolver};
use crate::types::{ExhibitionData, FellowshipData};

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("site root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to walk site: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One menu link as seen from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub target: String,
    pub resolution: Resolution,
}

impl LinkReport {
    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// Site-root path of the page, e.g. `/program/calendar.html`.
    pub page: String,
    pub links: Vec<LinkReport>,
}

impl PageReport {
    pub fn unresolved(&self) -> impl Iterator<Item = &LinkReport> {
        self.links.iter().filter(|l| !l.is_resolved())
    }
}

/// Parse result for one content document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub pages: Vec<PageReport>,
    pub documents: Vec<DocumentReport>,
}

impl CheckReport {
    pub fn unresolved_count(&self) -> usize {
        self.pages.iter().map(|p| p.unresolved().count()).sum()
    }

    pub fn broken_documents(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| d.error.is_some())
    }

    pub fn is_ok(&self) -> bool {
        self.unresolved_count() == 0 && self.broken_documents().next().is_none()
    }
}

/// Site-root paths of every HTML page under `root`, sorted. Hidden
/// directories are skipped.
pub fn site_pages(root: &Path) -> Result<Vec<String>, CheckError> {
    if !root.is_dir() {
        return Err(CheckError::NotADirectory(root.to_path_buf()));
    }
    let mut pages = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        pages.push(format!("/{}", segments.join("/")));
    }
    pages.sort();
    Ok(pages)
}

async fn check_document<T: serde::de::DeserializeOwned>(
    source: &impl ContentSource,
    path: &str,
) -> DocumentReport {
    let error = fetch_json::<T>(source, path).await.err().map(|e| e.to_string());
    DocumentReport {
        path: path.to_string(),
        error,
    }
}

/// Check every page of the site at `root`.
pub async fn check_site(root: &Path, config: &SiteConfig) -> Result<CheckReport, CheckError> {
    let pages = site_pages(root)?;
    info!(root = %root.display(), pages = pages.len(), "checking site");

    let source = FsSource::new(root);
    let menu = load_menu(&source, config.content.navigation_data.as_deref()).await;
    let targets = menu.targets();
    let options = ResolveOptions::from(&config.navigation);

    let mut report = CheckReport::default();
    for page in pages {
        let location = PageLocation::new(&page);
        let prober = FsProber::new(root, &location);
        let resolver = Resolver::new(prober, location, options.clone());
        let mut links = Vec::with_capacity(targets.len());
        for target in &targets {
            let resolution = resolver.resolve(target).await;
            debug!(page = %page, link = %target, ?resolution, "checked link");
            links.push(LinkReport {
                target: target.to_string(),
                resolution,
            });
        }
        report.pages.push(PageReport { page, links });
    }

    report.documents.push(
        check_document::<FellowshipData>(&source, &config.content.fellowship_data).await,
    );
    report.documents.push(
        check_document::<ExhibitionData>(&source, &config.content.exhibition_data).await,
    );
    Ok(report)
}
