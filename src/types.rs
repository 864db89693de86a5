//! JSON document contracts consumed by the page.
//!
//! These mirror the CMS output the site is fed with. Every field the pages
//! can live without is optional, so a sparse document still renders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fellowship page document (`fellowship-data.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FellowshipData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort_title: Option<String>,
    #[serde(default)]
    pub fellows: Vec<Fellow>,
}

/// How a fellow's media is presented in the expanded row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    #[default]
    Single,
    Carousel,
}

/// A fellow's display number. Documents write it either as a string
/// (`"07"`) or as a bare integer (`7`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FellowNumber {
    Int(i64),
    Text(String),
}

impl fmt::Display for FellowNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FellowNumber::Int(n) => write!(f, "{n}"),
            FellowNumber::Text(s) => f.write_str(s),
        }
    }
}

/// One fellow record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fellow {
    /// Stable identifier; also the carousel id for carousel media.
    pub id: String,
    pub name: String,
    /// Display number in the table's first column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<FellowNumber>,
    /// Heading of the expanded row; falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Markdown biography.
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_images: Vec<ImageRef>,
    #[serde(default)]
    pub image_type: ImageType,
}

impl Fellow {
    /// Slides in display order: the primary image first, then the extras.
    pub fn slides(&self) -> Vec<ImageRef> {
        let mut slides = Vec::with_capacity(self.additional_images.len() + 1);
        if let Some(src) = &self.image {
            slides.push(ImageRef {
                src: src.clone(),
                caption: self.caption.clone(),
            });
        }
        slides.extend(self.additional_images.iter().cloned());
        slides
    }
}

/// An image source with an optional photo credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// The exhibition page document (`exhibition-data.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhibitionData {
    pub title: String,
    #[serde(default)]
    pub date_range: String,
    #[serde(default)]
    pub images: Vec<ExhibitionImage>,
    /// Markdown; blank lines separate paragraphs.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhibitionImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Navigation menu item (`navigation-data.json`): a direct link or a
/// labeled group of sub-links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavItem {
    Group { label: String, children: Vec<NavLink> },
    Link(NavLink),
}

impl NavItem {
    pub fn label(&self) -> &str {
        match self {
            NavItem::Group { label, .. } => label,
            NavItem::Link(link) => &link.label,
        }
    }

    /// Every link reachable from this item, in menu order.
    pub fn links(&self) -> Vec<&NavLink> {
        match self {
            NavItem::Group { children, .. } => children.iter().collect(),
            NavItem::Link(link) => vec![link],
        }
    }
}

/// A labeled link to a symbolic, site-root-relative target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}
