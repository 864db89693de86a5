//! Shared test utilities for the gallery-kit test suite.
//!
//! Provides page builders, carousel assertions, and fakes for the two
//! outside-world seams of navigation: existence probes and the browser's
//! location.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut page = page_with_carousels(&[("te", 3), ("akr", 2)]);
//! let mut engine = CarouselEngine::new(Duration::from_millis(4000));
//! engine.init_all(&mut page);
//! assert_single_active(&page, "te", 0);
//!
//! let prober = FakeProber::with_existing(&["../about/mission.html"]);
//! let nav = Navigator::new(resolver(prober, "/program/calendar.html"), RecordingLocation::default(), FallbackPolicy::Direct);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::NavigationConfig;
use crate::navigate::LocationSink;
use crate::page::{CarouselMarkup, Dot, FellowRow, ImageElement, Media, Page, Row, Slide};
use crate::probe::{ProbeError, Prober};
use crate::resolve::{PageLocation, ResolveOptions, Resolver};

pub const TEST_PLACEHOLDER: &str = "/img/placeholder.png";

// =========================================================================
// Page builders
// =========================================================================

/// A page with one fellow row per `(id, slides)` entry. Each row carries a
/// carousel with the same id; no slide is marked active yet.
pub fn page_with_carousels(carousels: &[(&str, usize)]) -> Page {
    let mut page = Page::new("/program/fellowship.html");
    for &(id, count) in carousels {
        let slides = (0..count)
            .map(|i| Slide {
                image: ImageElement::new(
                    format!("/img/{id}-{i}.jpg"),
                    format!("{id} {i}"),
                    TEST_PLACEHOLDER,
                ),
                caption: None,
                active: false,
            })
            .collect();
        let dots = if count > 1 {
            vec![Dot::default(); count]
        } else {
            Vec::new()
        };
        page.rows.push(Row::Fellow(FellowRow {
            id: id.to_string(),
            number: None,
            name: id.to_uppercase(),
            title: String::new(),
            bio_html: String::new(),
            expanded: false,
            media: Media::Carousel(CarouselMarkup {
                id: id.to_string(),
                slides,
                dots,
            }),
        }));
    }
    page
}

// =========================================================================
// Carousel assertions
// =========================================================================

/// Assert exactly one slide is active and it is `index`, with the matching
/// dot (if the carousel has dots).
pub fn assert_single_active(page: &Page, id: &str, index: usize) {
    let carousel = page
        .carousel(id)
        .unwrap_or_else(|| panic!("carousel '{id}' not on the page"));
    let active: Vec<usize> = carousel
        .slides
        .iter()
        .enumerate()
        .filter(|(_, s)| s.active)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(active, vec![index], "active slides of '{id}'");
    if !carousel.dots.is_empty() {
        let dots = carousel.dots.iter().filter(|d| d.active).count();
        assert_eq!(dots, 1, "active dots of '{id}'");
        assert_eq!(carousel.active_dot(), Some(index), "active dot of '{id}'");
    }
}

// =========================================================================
// Navigation fakes
// =========================================================================

/// In-memory prober: a fixed set of existing URLs, optional per-URL
/// latency, and a log of every URL probed.
#[derive(Debug, Default)]
pub struct FakeProber {
    existing: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    failing: HashSet<String>,
    log: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn with_existing(urls: &[&str]) -> Self {
        Self {
            existing: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Make probes of `url` take `delay` (virtual time under `start_paused`).
    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn delay_all(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Make probes of `url` fail with a transport error.
    pub fn fail(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn probed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl Prober for FakeProber {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError> {
        self.log.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(url) {
            return Err(ProbeError::Unreachable(format!("connection refused: {url}")));
        }
        Ok(self.existing.contains(url))
    }
}

/// Records every URL the navigator assigns to the window location.
#[derive(Debug, Default)]
pub struct RecordingLocation {
    assigned: Mutex<Vec<String>>,
}

impl RecordingLocation {
    pub fn assigned(&self) -> Vec<String> {
        self.assigned.lock().unwrap().clone()
    }
}

impl LocationSink for RecordingLocation {
    fn assign(&self, url: &str) {
        self.assigned.lock().unwrap().push(url.to_string());
    }
}

/// Resolver with default timeouts for a page at `location`.
pub fn resolver(prober: FakeProber, location: &str) -> Resolver<FakeProber> {
    Resolver::new(
        prober,
        PageLocation::new(location),
        ResolveOptions::from(&NavigationConfig::default()),
    )
}

// =========================================================================
// Sample documents
// =========================================================================

pub const FELLOWSHIP_JSON: &str = r#"{
  "title": "Fellowship",
  "heading": "2025 & 2026 Fellows",
  "intro": "Our fellows work across painting, sculpture, and film.",
  "cohort_title": "2025-2026 Cohort",
  "fellows": [
    {
      "id": "te",
      "name": "Tomás Esquivel",
      "number": "01",
      "title": "Painter",
      "bio": "Works in **oil** and wax.\n\nLives in Queens.",
      "image": "/img/te-1.jpg",
      "caption": "Studio view",
      "image_type": "carousel",
      "additional_images": [
        { "src": "/img/te-2.jpg", "caption": "Detail" },
        { "src": "/img/te-3.jpg" }
      ]
    },
    {
      "id": "kq",
      "name": "Kechun Qin",
      "number": "02",
      "title": "Sculptor",
      "bio": "Cast bronze and found objects.",
      "image": "/img/kq.jpg"
    },
    {
      "id": "mr",
      "name": "Mara Ruiz",
      "bio": "Filmmaker."
    }
  ]
}"#;

pub const EXHIBITION_JSON: &str = r#"{
  "title": "Tidelines",
  "date_range": "March 3 - April 18, 2026",
  "description": "A group show of new work.",
  "pdf_url": "/docs/tidelines.pdf",
  "images": [
    { "url": "/img/ex-1.jpg", "alt": "Installation view", "caption": "North wall" },
    { "url": "/img/ex-2.jpg", "alt": "Detail" },
    { "url": "/img/ex-3.jpg" },
    { "url": "/img/ex-4.jpg" }
  ]
}"#;
