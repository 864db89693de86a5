//! Content loading: JSON documents into the page model.
//!
//! Documents are fetched through a [`ContentSource`] so the same loader
//! works against a built site on disk ([`FsSource`]) and a live site
//! ([`HttpSource`]). A failed fetch never aborts the page: the loader puts
//! a visible error row into the fellows table and reports the error to the
//! caller.
//!
//! Biographies are Markdown and rendered to HTML here, once, so the page
//! model only ever carries finished markup.

use std::path::PathBuf;

use pulldown_cmark::{Parser, html as md_html};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::page::{CarouselMarkup, Dot, FellowRow, ImageElement, Media, Page, Row, Slide};
use crate::types::{Fellow, FellowshipData, ImageType};

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(u16),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL {0:?}: {1}")]
    InvalidUrl(String, String),
}

/// Where content documents come from. Paths are site-root paths such as
/// `/fellowship-data.json`.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    async fn fetch(&self, path: &str) -> Result<String, ContentError>;
}

/// Reads documents from a site directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String, ContentError> {
        let full = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| ContentError::Io {
                path: full.display().to_string(),
                source,
            })
    }
}

/// Fetches documents from a live site with `GET`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: Url) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base })
    }
}

impl ContentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, ContentError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ContentError::InvalidUrl(path.to_string(), e.to_string()))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

pub async fn fetch_json<T: DeserializeOwned>(
    source: &impl ContentSource,
    path: &str,
) -> Result<T, ContentError> {
    let body = source.fetch(path).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Fetch the fellowship document and mount it into `page`.
///
/// On failure the page gets an error row and keeps whatever it had.
pub async fn load_fellowship(
    page: &mut Page,
    source: &impl ContentSource,
    path: &str,
    placeholder: &str,
) -> Result<(), ContentError> {
    match fetch_json::<FellowshipData>(source, path).await {
        Ok(data) => {
            mount_fellowship(page, &data, placeholder);
            Ok(())
        }
        Err(e) => {
            error!(path, error = %e, "failed to load fellowship data");
            page.rows
                .push(Row::Error(format!("Could not load fellowship data: {e}")));
            Err(e)
        }
    }
}

/// Write a fellowship document into the page.
///
/// Header fields present in the document replace the page's; an empty
/// fellows list leaves the existing table alone.
pub fn mount_fellowship(page: &mut Page, data: &FellowshipData, placeholder: &str) {
    if let Some(title) = &data.title {
        page.title = Some(title.clone());
    }
    if let Some(heading) = &data.heading {
        page.heading = Some(heading.clone());
    }
    if let Some(intro) = &data.intro {
        page.intro = Some(intro.clone());
    }
    if let Some(cohort) = &data.cohort_title {
        page.cohort_title = Some(cohort.clone());
    }
    if data.fellows.is_empty() {
        return;
    }
    page.rows = data
        .fellows
        .iter()
        .map(|fellow| Row::Fellow(fellow_row(fellow, placeholder)))
        .collect();
    debug!(fellows = page.rows.len(), "fellowship mounted");
}

fn fellow_row(fellow: &Fellow, placeholder: &str) -> FellowRow {
    FellowRow {
        id: fellow.id.clone(),
        number: fellow.number.as_ref().map(ToString::to_string),
        name: fellow.name.clone(),
        title: fellow.title.clone().unwrap_or_else(|| fellow.name.clone()),
        bio_html: render_markdown(&fellow.bio),
        expanded: false,
        media: fellow_media(fellow, placeholder),
    }
}

fn fellow_media(fellow: &Fellow, placeholder: &str) -> Media {
    match fellow.image_type {
        ImageType::Single => match &fellow.image {
            Some(src) => Media::Single {
                image: ImageElement::new(src, &fellow.name, placeholder),
                caption: fellow.caption.clone(),
            },
            None => Media::None,
        },
        ImageType::Carousel => {
            let slides: Vec<Slide> = fellow
                .slides()
                .into_iter()
                .enumerate()
                .map(|(i, image)| Slide {
                    image: ImageElement::new(image.src, &fellow.name, placeholder),
                    caption: image.caption,
                    active: i == 0,
                })
                .collect();
            if slides.is_empty() {
                return Media::None;
            }
            let dots = if slides.len() > 1 {
                (0..slides.len()).map(|i| Dot { active: i == 0 }).collect()
            } else {
                Vec::new()
            };
            Media::Carousel(CarouselMarkup {
                id: fellow.id.clone(),
                slides,
                dots,
            })
        }
    }
}

pub fn render_markdown(source: &str) -> String {
    let mut html = String::new();
    md_html::push_html(&mut html, Parser::new(source));
    html
}
