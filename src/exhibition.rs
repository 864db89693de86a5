//! Exhibition view: a horizontally scrolling image strip with pagination
//! dots, a lightbox, and keyboard control.
//!
//! Scrolling is clamped at both ends (unlike carousel auto-advance, it
//! never wraps). When the exhibition document cannot be loaded the view
//! falls back to built-in content plus an error message.

use tracing::error;

use crate::content::{ContentSource, fetch_json};
use crate::types::{ExhibitionData, ExhibitionImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Keys the view responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "Escape" => Some(Key::Escape),
            _ => None,
        }
    }
}

pub const LOAD_ERROR_MESSAGE: &str =
    "Could not load exhibition data. Please try again later.";

#[derive(Debug, Clone)]
pub struct ExhibitionView {
    data: ExhibitionData,
    current: usize,
    lightbox: Option<String>,
    error: Option<String>,
}

impl ExhibitionView {
    pub fn new(data: ExhibitionData) -> Self {
        Self {
            data,
            current: 0,
            lightbox: None,
            error: None,
        }
    }

    /// Built-in content shown when the document is unavailable.
    pub fn fallback(message: impl Into<String>) -> Self {
        let data = ExhibitionData {
            title: "Embodied Memories".to_string(),
            date_range: "April 15 - June 30, 2025".to_string(),
            images: vec![ExhibitionImage {
                url: "img/exhibition/1.png".to_string(),
                alt: Some("Exhibition: Embodied Memories".to_string()),
                caption: Some("Exhibition overview: Embodied Memories".to_string()),
            }],
            description: "Initial Research presents **Embodied Memories: Tracing Asian \
                Diaspora Through Material Culture**, a group exhibition exploring how \
                artists of Asian diaspora use material culture to navigate complex \
                identities and histories."
                .to_string(),
            pdf_url: None,
        };
        Self {
            error: Some(message.into()),
            ..Self::new(data)
        }
    }

    pub fn data(&self) -> &ExhibitionData {
        &self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.data.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.images.is_empty()
    }

    /// Alt text for an image, defaulting to the exhibition title.
    pub fn alt(&self, index: usize) -> &str {
        self.data
            .images
            .get(index)
            .and_then(|img| img.alt.as_deref())
            .unwrap_or(self.data.title.as_str())
    }

    /// Description paragraphs, split on blank lines.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.data
            .description
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Active flag per pagination dot.
    pub fn dots(&self) -> Vec<bool> {
        (0..self.len()).map(|i| i == self.current).collect()
    }

    /// Scroll one image, clamped at both ends. Returns the new index.
    pub fn scroll(&mut self, direction: ScrollDirection) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.current = match direction {
            ScrollDirection::Left => self.current.saturating_sub(1),
            ScrollDirection::Right => (self.current + 1).min(self.len() - 1),
        };
        self.current
    }

    /// Jump to an image (a dot click). Out-of-range indexes are ignored.
    pub fn scroll_to(&mut self, index: usize) -> bool {
        if index >= self.len() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn open_lightbox(&mut self, index: usize) -> bool {
        match self.data.images.get(index) {
            Some(image) => {
                self.lightbox = Some(image.url.clone());
                true
            }
            None => false,
        }
    }

    pub fn close_lightbox(&mut self) -> bool {
        self.lightbox.take().is_some()
    }

    /// Source of the image in the open lightbox.
    pub fn lightbox(&self) -> Option<&str> {
        self.lightbox.as_deref()
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                self.scroll(ScrollDirection::Left);
            }
            Key::ArrowRight => {
                self.scroll(ScrollDirection::Right);
            }
            Key::Escape => {
                self.close_lightbox();
            }
        }
    }
}

/// Fetch the exhibition document; falls back to built-in content.
pub async fn load_exhibition(source: &impl ContentSource, path: &str) -> ExhibitionView {
    match fetch_json::<ExhibitionData>(source, path).await {
        Ok(data) => ExhibitionView::new(data),
        Err(e) => {
            error!(path, error = %e, "failed to load exhibition data");
            ExhibitionView::fallback(LOAD_ERROR_MESSAGE)
        }
    }
}
