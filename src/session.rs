//! Page bootstrap and event dispatch.
//!
//! A [`Session`] is one page load: the page model, its carousel engine, the
//! menu, and the navigator, wired to the events a browser would deliver.
//! Handlers never return errors; failures end up on the page (error row,
//! placeholder image, not-found overlay) or in the log.

use std::time::Duration;

use maud::Markup;
use tracing::{debug, info};

use crate::carousel::CarouselEngine;
use crate::config::SiteConfig;
use crate::content::{ContentSource, load_fellowship};
use crate::menu::{Menu, load_menu};
use crate::navigate::{LocationSink, NavEvent, NavigateOutcome, Navigator, apply_outcome};
use crate::page::{ImageTarget, Page};
use crate::probe::Prober;
use crate::render::render_fellowship_page;

/// A synchronous DOM event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Click on a fellow's summary row.
    RowClicked(String),
    /// Click on a detail row's close button.
    RowClosed(String),
    DotClicked { carousel: String, index: usize },
    ArrowClicked { carousel: String, delta: isize },
    ImageFailed(ImageTarget),
    OverlayDismissed,
    DropdownToggled(usize),
    MenuHover(usize),
    MenuLeave(usize),
    ClickOutside,
    HamburgerClicked,
    MobileDropdownToggled(usize),
    Resized(u32),
    /// Time passed on the page's clock.
    Elapsed(Duration),
}

pub struct Session<P, L> {
    pub page: Page,
    pub engine: CarouselEngine,
    pub menu: Menu,
    navigator: Navigator<P, L>,
    config: SiteConfig,
}

impl<P: Prober, L: LocationSink> Session<P, L> {
    pub fn new(page: Page, menu: Menu, navigator: Navigator<P, L>, config: SiteConfig) -> Self {
        Self {
            page,
            engine: CarouselEngine::from_config(&config.carousel),
            menu,
            navigator,
            config,
        }
    }

    /// Load content and menu, insert the footer, and start carousels.
    pub async fn bootstrap(
        config: SiteConfig,
        source: &impl ContentSource,
        navigator: Navigator<P, L>,
    ) -> Self {
        let location = navigator.resolver().location().path().to_string();
        let mut page = Page::new(location);
        let menu = load_menu(source, config.content.navigation_data.as_deref()).await;
        // A failed load leaves an error row on the page; nothing to propagate.
        let _ = load_fellowship(
            &mut page,
            source,
            &config.content.fellowship_data,
            &config.carousel.placeholder,
        )
        .await;
        page.ensure_footer(&config.site.footer);

        let mut session = Self::new(page, menu, navigator, config);
        let started = session.engine.init_all(&mut session.page);
        info!(
            page = %session.page.location,
            fellows = session.page.fellows().count(),
            carousels = started,
            "page ready"
        );
        session
    }

    pub fn navigator(&self) -> &Navigator<P, L> {
        &self.navigator
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Dispatch a DOM event. Returns whether anything changed.
    pub fn handle(&mut self, event: PageEvent) -> bool {
        debug!(?event, "page event");
        match event {
            PageEvent::RowClicked(id) => {
                let changes = self.page.toggle_row(&id);
                for change in &changes {
                    self.row_changed(&change.fellow_id, change.expanded);
                }
                !changes.is_empty()
            }
            PageEvent::RowClosed(id) => match self.page.close_row(&id) {
                Some(change) => {
                    self.row_changed(&change.fellow_id, false);
                    true
                }
                None => false,
            },
            PageEvent::DotClicked { carousel, index } => {
                self.engine.select(&mut self.page, &carousel, index)
            }
            PageEvent::ArrowClicked { carousel, delta } => {
                self.engine.step(&mut self.page, &carousel, delta)
            }
            PageEvent::ImageFailed(target) => self.page.image_failed(&target),
            PageEvent::OverlayDismissed => self.page.dismiss_overlay(),
            PageEvent::DropdownToggled(index) => self.menu.toggle_dropdown(index),
            PageEvent::MenuHover(index) => {
                self.menu.hover(index);
                true
            }
            PageEvent::MenuLeave(index) => {
                self.menu.leave(index);
                true
            }
            PageEvent::ClickOutside => {
                self.menu.click_outside();
                true
            }
            PageEvent::HamburgerClicked => {
                self.menu.toggle_mobile();
                true
            }
            PageEvent::MobileDropdownToggled(index) => self.menu.toggle_mobile_dropdown(index),
            PageEvent::Resized(width) => {
                self.menu.resize(width);
                true
            }
            PageEvent::Elapsed(by) => self.engine.advance(&mut self.page, by) > 0,
        }
    }

    /// Expanding a row starts its carousels; collapsing destroys them.
    fn row_changed(&mut self, fellow_id: &str, expanded: bool) {
        let ids = self.page.carousels_in_row(fellow_id);
        if expanded {
            self.engine.init_ids(&mut self.page, &ids);
        } else {
            self.engine.evict(&ids);
        }
    }

    /// A menu link was clicked.
    pub async fn click_link(&mut self, href: &str) -> (NavigateOutcome, NavEvent) {
        let mut event = NavEvent::new();
        self.menu.link_clicked();
        let outcome = self.navigator.navigate(href, Some(&mut event)).await;
        apply_outcome(&mut self.page, &outcome);
        (outcome, event)
    }

    /// The banner title was clicked.
    pub async fn click_title(&mut self) -> NavigateOutcome {
        let outcome = self.navigator.go_home().await;
        apply_outcome(&mut self.page, &outcome);
        outcome
    }

    pub fn render(&self) -> Markup {
        render_fellowship_page(
            &self.page,
            &self.menu,
            &self.config.site,
            &self.navigator.resolver().home_url(),
        )
    }
}
