//! Site menu: items, dropdown state, and the mobile menu.
//!
//! Desktop dropdowns are exclusive: opening one closes the others, and a
//! click anywhere outside the menu closes all of them. The mobile menu is
//! a separate panel toggled by the hamburger button; closing it collapses
//! its dropdowns too.
//!
//! Items come from an optional JSON document. A missing or unparseable
//! document falls back to the built-in menu.

use tracing::{debug, warn};

use crate::content::{ContentSource, fetch_json};
use crate::types::{NavItem, NavLink};

/// Widths above this are desktop layout.
pub const MOBILE_BREAKPOINT: u32 = 768;

fn link(label: &str, href: &str) -> NavLink {
    NavLink {
        label: label.to_string(),
        href: href.to_string(),
    }
}

/// The menu used when no navigation document is configured or it fails
/// to load.
pub fn default_items() -> Vec<NavItem> {
    vec![
        NavItem::Group {
            label: "program".to_string(),
            children: vec![
                link("calendar", "program/calendar.html"),
                link("fellowship", "program/fellowship.html"),
                link("community hours", "program/communityhours.html"),
                link("seasonal dinner", "program/seasonaldinner.html"),
                link("exhibitions", "program/exhibition.html"),
            ],
        },
        NavItem::Group {
            label: "about".to_string(),
            children: vec![
                link("mission", "about/mission.html"),
                link("vision", "about/vision.html"),
                link("team", "about/team.html"),
                link("contact", "about/contact.html"),
            ],
        },
        NavItem::Link(link("support us", "supportus/supportus.html")),
    ]
}

#[derive(Debug, Clone)]
pub struct Menu {
    items: Vec<NavItem>,
    open: Option<usize>,
    mobile_open: bool,
    mobile_expanded: Option<usize>,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new(default_items())
    }
}

impl Menu {
    pub fn new(items: Vec<NavItem>) -> Self {
        Self {
            items,
            open: None,
            mobile_open: false,
            mobile_expanded: None,
        }
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Every link target in menu order.
    pub fn targets(&self) -> Vec<&str> {
        self.items
            .iter()
            .flat_map(|item| item.links())
            .map(|l| l.href.as_str())
            .collect()
    }

    fn is_group(&self, index: usize) -> bool {
        matches!(self.items.get(index), Some(NavItem::Group { .. }))
    }

    /// Index of the open desktop dropdown.
    pub fn open_dropdown(&self) -> Option<usize> {
        self.open
    }

    /// Click on a dropdown toggle. Returns whether the item is a dropdown.
    pub fn toggle_dropdown(&mut self, index: usize) -> bool {
        if !self.is_group(index) {
            return false;
        }
        self.open = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }

    /// Desktop hover opens a dropdown exclusively.
    pub fn hover(&mut self, index: usize) {
        if self.is_group(index) {
            self.open = Some(index);
        }
    }

    /// The pointer left an item.
    pub fn leave(&mut self, index: usize) {
        if self.open == Some(index) {
            self.open = None;
        }
    }

    /// A direct link was followed; every dropdown closes.
    pub fn link_clicked(&mut self) {
        self.open = None;
    }

    /// A click landed outside the menu and the mobile panel.
    pub fn click_outside(&mut self) {
        self.open = None;
        self.close_mobile();
    }

    pub fn is_mobile_open(&self) -> bool {
        self.mobile_open
    }

    pub fn mobile_expanded(&self) -> Option<usize> {
        self.mobile_expanded
    }

    /// The hamburger button.
    pub fn toggle_mobile(&mut self) {
        if self.mobile_open {
            self.close_mobile();
        } else {
            self.mobile_open = true;
        }
    }

    fn close_mobile(&mut self) {
        self.mobile_open = false;
        self.mobile_expanded = None;
    }

    /// A mobile dropdown toggle. Only one mobile dropdown is expanded at a
    /// time; plain links are not toggles.
    pub fn toggle_mobile_dropdown(&mut self, index: usize) -> bool {
        if !self.is_group(index) {
            return false;
        }
        self.mobile_expanded = if self.mobile_expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }

    /// The viewport was resized. Growing to desktop width closes the
    /// mobile panel.
    pub fn resize(&mut self, width: u32) {
        if width > MOBILE_BREAKPOINT {
            self.close_mobile();
        }
    }
}

/// Load the menu document, or the built-in menu when `path` is `None` or
/// the document is unusable.
pub async fn load_menu(source: &impl ContentSource, path: Option<&str>) -> Menu {
    let Some(path) = path else {
        return Menu::default();
    };
    match fetch_json::<Vec<NavItem>>(source, path).await {
        Ok(items) if !items.is_empty() => {
            debug!(path, items = items.len(), "menu loaded");
            Menu::new(items)
        }
        Ok(_) => {
            warn!(path, "menu document is empty, using default menu");
            Menu::default()
        }
        Err(e) => {
            warn!(path, error = %e, "failed to load menu, using default menu");
            Menu::default()
        }
    }
}
