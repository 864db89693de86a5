//! In-memory model of the fellowship page.
//!
//! This is the document the content loader writes into, the carousel engine
//! reads and marks, and the renderer serializes. It keeps only the parts of
//! the page that behavior depends on: header text, the fellows table with
//! its expandable rows and media, error rows, the not-found overlay, and
//! the footer.

use crate::carousel::CarouselDom;

/// The fellowship page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Site-root path of this page, e.g. `/program/fellowship.html`.
    pub location: String,
    pub title: Option<String>,
    pub heading: Option<String>,
    pub intro: Option<String>,
    pub cohort_title: Option<String>,
    pub rows: Vec<Row>,
    pub overlay: Option<Overlay>,
    pub footer: Option<String>,
}

/// A row of the fellows table.
#[derive(Debug, Clone)]
pub enum Row {
    Fellow(FellowRow),
    /// Visible in-page error, e.g. the content document failed to load.
    Error(String),
}

/// A fellow's summary row together with its expandable detail row.
#[derive(Debug, Clone)]
pub struct FellowRow {
    pub id: String,
    pub number: Option<String>,
    pub name: String,
    pub title: String,
    /// Biography already rendered to HTML.
    pub bio_html: String,
    pub expanded: bool,
    pub media: Media,
}

#[derive(Debug, Clone)]
pub enum Media {
    None,
    Single {
        image: ImageElement,
        caption: Option<String>,
    },
    Carousel(CarouselMarkup),
}

/// A carousel container: ordered slides and, for more than one slide, one
/// dot per slide.
#[derive(Debug, Clone)]
pub struct CarouselMarkup {
    pub id: String,
    pub slides: Vec<Slide>,
    pub dots: Vec<Dot>,
}

impl CarouselMarkup {
    pub fn active_slide(&self) -> Option<usize> {
        self.slides.iter().position(|s| s.active)
    }

    pub fn active_dot(&self) -> Option<usize> {
        self.dots.iter().position(|d| d.active)
    }

    fn show(&mut self, index: usize) -> bool {
        if index >= self.slides.len() {
            return false;
        }
        for (i, slide) in self.slides.iter_mut().enumerate() {
            slide.active = i == index;
        }
        for (i, dot) in self.dots.iter_mut().enumerate() {
            dot.active = i == index;
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub image: ImageElement,
    pub caption: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Dot {
    pub active: bool,
}

/// An `<img>` with a one-shot error handler.
///
/// The handler holds the placeholder source. The first failure swaps it in
/// and disarms the handler, so a placeholder that fails too stays put.
#[derive(Debug, Clone)]
pub struct ImageElement {
    pub src: String,
    pub alt: String,
    on_error: Option<String>,
}

impl ImageElement {
    pub fn new(src: impl Into<String>, alt: impl Into<String>, placeholder: &str) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            on_error: Some(placeholder.to_string()),
        }
    }

    /// Handle a load failure. Returns whether the source was replaced.
    pub fn fail(&mut self) -> bool {
        match self.on_error.take() {
            Some(placeholder) => {
                self.src = placeholder;
                true
            }
            None => false,
        }
    }

    pub fn has_error_handler(&self) -> bool {
        self.on_error.is_some()
    }

    /// Placeholder the armed handler would swap in.
    pub fn fallback_src(&self) -> Option<&str> {
        self.on_error.as_deref()
    }
}

/// Addresses one image element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTarget {
    /// The single image of a fellow's detail row.
    Single(String),
    /// A slide image, by carousel id and slide index.
    Slide(String, usize),
}

/// Dismissible "page not found" notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub target: String,
    pub message: String,
}

/// A row that changed expansion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChange {
    pub fellow_id: String,
    pub expanded: bool,
}

impl Page {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn fellows(&self) -> impl Iterator<Item = &FellowRow> {
        self.rows.iter().filter_map(|row| match row {
            Row::Fellow(f) => Some(f),
            Row::Error(_) => None,
        })
    }

    fn fellows_mut(&mut self) -> impl Iterator<Item = &mut FellowRow> {
        self.rows.iter_mut().filter_map(|row| match row {
            Row::Fellow(f) => Some(f),
            Row::Error(_) => None,
        })
    }

    pub fn fellow(&self, id: &str) -> Option<&FellowRow> {
        self.fellows().find(|f| f.id == id)
    }

    pub fn error_rows(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Error(msg) => Some(msg.as_str()),
                Row::Fellow(_) => None,
            })
            .collect()
    }

    pub fn carousel(&self, id: &str) -> Option<&CarouselMarkup> {
        self.fellows().find_map(|f| match &f.media {
            Media::Carousel(c) if c.id == id => Some(c),
            _ => None,
        })
    }

    fn carousel_mut(&mut self, id: &str) -> Option<&mut CarouselMarkup> {
        self.fellows_mut().find_map(|f| match &mut f.media {
            Media::Carousel(c) if c.id == id => Some(c),
            _ => None,
        })
    }

    /// Carousel ids inside one fellow's detail row.
    pub fn carousels_in_row(&self, fellow_id: &str) -> Vec<String> {
        self.fellow(fellow_id)
            .and_then(|f| match &f.media {
                Media::Carousel(c) => Some(vec![c.id.clone()]),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Remove a carousel container from the document, leaving the row.
    pub fn remove_carousel(&mut self, id: &str) -> bool {
        for fellow in self.fellows_mut() {
            if matches!(&fellow.media, Media::Carousel(c) if c.id == id) {
                fellow.media = Media::None;
                return true;
            }
        }
        false
    }

    /// Toggle a fellow's detail row. Opening a row closes any other open
    /// row. Returns every row whose state changed; empty for unknown ids.
    pub fn toggle_row(&mut self, fellow_id: &str) -> Vec<RowChange> {
        let Some(open) = self.fellow(fellow_id).map(|f| f.expanded) else {
            return Vec::new();
        };
        let mut changes = Vec::new();
        for fellow in self.fellows_mut() {
            let expanded = fellow.id == fellow_id && !open;
            if fellow.expanded != expanded {
                fellow.expanded = expanded;
                changes.push(RowChange {
                    fellow_id: fellow.id.clone(),
                    expanded,
                });
            }
        }
        changes
    }

    /// Close a fellow's detail row (the row's close button).
    pub fn close_row(&mut self, fellow_id: &str) -> Option<RowChange> {
        let fellow = self.fellows_mut().find(|f| f.id == fellow_id)?;
        if !fellow.expanded {
            return None;
        }
        fellow.expanded = false;
        Some(RowChange {
            fellow_id: fellow_id.to_string(),
            expanded: false,
        })
    }

    pub fn image(&self, target: &ImageTarget) -> Option<&ImageElement> {
        match target {
            ImageTarget::Single(fellow_id) => match &self.fellow(fellow_id)?.media {
                Media::Single { image, .. } => Some(image),
                _ => None,
            },
            ImageTarget::Slide(carousel_id, index) => self
                .carousel(carousel_id)?
                .slides
                .get(*index)
                .map(|s| &s.image),
        }
    }

    fn image_mut(&mut self, target: &ImageTarget) -> Option<&mut ImageElement> {
        match target {
            ImageTarget::Single(fellow_id) => {
                let fellow = self.fellows_mut().find(|f| f.id == *fellow_id)?;
                match &mut fellow.media {
                    Media::Single { image, .. } => Some(image),
                    _ => None,
                }
            }
            ImageTarget::Slide(carousel_id, index) => self
                .carousel_mut(carousel_id)?
                .slides
                .get_mut(*index)
                .map(|s| &mut s.image),
        }
    }

    /// An image failed to load. Returns whether the placeholder was swapped
    /// in; false for a disarmed handler or a missing element.
    pub fn image_failed(&mut self, target: &ImageTarget) -> bool {
        self.image_mut(target).is_some_and(ImageElement::fail)
    }

    pub fn show_not_found(&mut self, target: &str) {
        self.overlay = Some(Overlay {
            target: target.to_string(),
            message: format!("Page not found: {target}"),
        });
    }

    /// Remove the overlay. Returns whether one was showing.
    pub fn dismiss_overlay(&mut self) -> bool {
        self.overlay.take().is_some()
    }

    /// Insert the footer unless the page already has one.
    pub fn ensure_footer(&mut self, text: &str) -> bool {
        if self.footer.is_some() {
            return false;
        }
        self.footer = Some(text.to_string());
        true
    }
}

impl CarouselDom for Page {
    fn carousel_ids(&self) -> Vec<String> {
        self.fellows()
            .filter_map(|f| match &f.media {
                Media::Carousel(c) => Some(c.id.clone()),
                _ => None,
            })
            .collect()
    }

    fn slide_count(&self, id: &str) -> Option<usize> {
        self.carousel(id).map(|c| c.slides.len())
    }

    fn show_slide(&mut self, id: &str, index: usize) -> bool {
        self.carousel_mut(id).is_some_and(|c| c.show(index))
    }
}
