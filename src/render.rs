//! HTML rendering of the page model.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating;
//! all text is escaped unless it is already-rendered Markdown.
//!
//! ## Rendered structure
//!
//! - **Banner**: site title (links home) and the menu, desktop dropdowns
//!   plus the mobile panel
//! - **Fellowship page**: header text, the fellows table (summary row and
//!   expandable detail row per fellow), error rows, not-found overlay
//! - **Exhibition page**: image strip with arrows and pagination dots,
//!   description paragraphs, optional PDF link, lightbox
//! - **Footer**
//!
//! Active slides and dots carry the `active` class; inactive slides are
//! hidden with `display: none` so the page is correct before any script
//! runs. Images carry a one-shot `onerror` that swaps in the placeholder.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::config::SiteSection;
use crate::content::render_markdown;
use crate::exhibition::ExhibitionView;
use crate::menu::Menu;
use crate::page::{CarouselMarkup, FellowRow, ImageElement, Media, Overlay, Page, Row};
use crate::types::NavItem;

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn onerror_script(placeholder: &str) -> String {
    format!("this.onerror=null;this.src='{}'", placeholder.replace('\'', "%27"))
}

/// Renders an image with its one-shot error handler
fn render_image(image: &ImageElement, class: &str) -> Markup {
    html! {
        img class=(class) src=(image.src) alt=(image.alt)
            onerror=[image.fallback_src().map(onerror_script)];
    }
}

/// Renders the banner: title and menu
pub fn render_banner(menu: &Menu, site: &SiteSection, home: &str) -> Markup {
    html! {
        div.top-banner {
            div.title-container {
                h1 { a href=(home) { (site.title) } }
            }
            nav.nav-top {
                @for (i, item) in menu.items().iter().enumerate() {
                    @let open = menu.open_dropdown() == Some(i);
                    div.nav-item.active[open] {
                        (render_desktop_item(item))
                    }
                }
            }
            div.hamburger-menu aria-expanded=(if menu.is_mobile_open() { "true" } else { "false" }) {
                span {}
                span {}
                span {}
            }
            div.mobile-nav.show[menu.is_mobile_open()] id="mobileNav" {
                @for (i, item) in menu.items().iter().enumerate() {
                    @let expanded = menu.mobile_expanded() == Some(i);
                    div.mobile-nav-item.active[expanded] {
                        (render_mobile_item(item))
                    }
                }
            }
        }
    }
}

fn render_desktop_item(item: &NavItem) -> Markup {
    html! {
        @match item {
            NavItem::Group { label, children } => {
                a.dropdown-toggle href="#" { (label) }
                div.dropdown {
                    div.dropdown-container {
                        @for link in children {
                            a href=(link.href) data-nav=(link.href) { (link.label) }
                        }
                    }
                }
            }
            NavItem::Link(link) => {
                a href=(link.href) data-nav=(link.href) { (link.label) }
            }
        }
    }
}

fn render_mobile_item(item: &NavItem) -> Markup {
    html! {
        @match item {
            NavItem::Group { label, children } => {
                a.mobile-dropdown-toggle href="#" {
                    (label)
                    span.mobile-arrow { "ᵥ" }
                }
                div.mobile-dropdown {
                    @for link in children {
                        a href=(link.href) data-nav=(link.href) { (link.label) }
                    }
                }
            }
            NavItem::Link(link) => {
                a href=(link.href) data-nav=(link.href) { (link.label) }
            }
        }
    }
}

/// Renders a carousel container
pub fn render_carousel(carousel: &CarouselMarkup) -> Markup {
    let multi = carousel.slides.len() > 1;
    html! {
        div.image-carousel data-carousel=(carousel.id) {
            div.carousel-container {
                @for slide in &carousel.slides {
                    div.carousel-slide.active[slide.active]
                        style=[(!slide.active).then_some("display: none")] {
                        (render_image(&slide.image, "expanded-image"))
                        div.photo-credit { (slide.caption.as_deref().unwrap_or_default()) }
                    }
                }
            }
            @if multi {
                button.carousel-arrow.carousel-prev type="button" { "←" }
                button.carousel-arrow.carousel-next type="button" { "→" }
            }
            @if !carousel.dots.is_empty() {
                div.carousel-dots {
                    @for (i, dot) in carousel.dots.iter().enumerate() {
                        span.carousel-dot.active[dot.active] data-index=(i) {}
                    }
                }
            }
        }
    }
}

fn render_media(media: &Media) -> Markup {
    html! {
        @match media {
            Media::None => {}
            Media::Single { image, caption } => {
                div.single-image-container {
                    (render_image(image, "expanded-image"))
                    div.photo-credit { (caption.as_deref().unwrap_or_default()) }
                }
            }
            Media::Carousel(carousel) => { (render_carousel(carousel)) }
        }
    }
}

fn render_fellow(fellow: &FellowRow) -> Markup {
    html! {
        tr.fellow-row.active[fellow.expanded] data-fellow-id=(fellow.id) {
            td.fellow-number { (fellow.number.as_deref().unwrap_or_default()) }
            td.fellow-name { (fellow.name) }
        }
        tr.expanded-row.show[fellow.expanded] id={ (fellow.id) "-row" } {
            td.expanded-cell colspan="2" {
                div.expanded-content id={ (fellow.id) "-content" } {
                    div.expanded-left {
                        h3.expanded-title { (fellow.title) }
                        div.expanded-text { (PreEscaped(&fellow.bio_html)) }
                    }
                    div.expanded-right {
                        (render_media(&fellow.media))
                    }
                    button.close-btn type="button" { "×" }
                }
            }
        }
    }
}

pub fn render_overlay(overlay: &Overlay) -> Markup {
    html! {
        div.not-found-overlay role="alert" data-target=(overlay.target) {
            p { (overlay.message) }
            button.overlay-dismiss type="button" { "Dismiss" }
        }
    }
}

fn render_footer(text: Option<&str>) -> Markup {
    html! {
        @if let Some(text) = text {
            footer { (text) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the fellowship page
pub fn render_fellowship_page(page: &Page, menu: &Menu, site: &SiteSection, home: &str) -> Markup {
    let title = page.title.as_deref().unwrap_or("Fellowship");
    let content = html! {
        (render_banner(menu, site, home))
        main {
            @if let Some(heading) = &page.heading {
                h2.main-headline { (heading) }
            }
            @if let Some(intro) = &page.intro {
                div.fellowship-intro { p { (intro) } }
            }
            @if let Some(cohort) = &page.cohort_title {
                h3.section-heading { (cohort) }
            }
            table.fellows-table {
                tbody {
                    @for row in &page.rows {
                        @match row {
                            Row::Fellow(fellow) => { (render_fellow(fellow)) }
                            Row::Error(message) => {
                                tr.error-row {
                                    td colspan="2" { (message) }
                                }
                            }
                        }
                    }
                }
            }
        }
        @if let Some(overlay) = &page.overlay {
            (render_overlay(overlay))
        }
        (render_footer(page.footer.as_deref()))
    };
    base_document(title, Some("fellowship"), content)
}

/// Renders the exhibition page
pub fn render_exhibition_page(
    view: &ExhibitionView,
    menu: &Menu,
    site: &SiteSection,
    home: &str,
) -> Markup {
    let data = view.data();
    let dots = view.dots();
    let content = html! {
        (render_banner(menu, site, home))
        main id="exhibition-content" {
            div.exhibition-heading {
                h1 { (data.title) }
                p { (data.date_range) }
            }
            @if let Some(error) = view.error() {
                div.error-message { p { (error) } }
            }
            div.hero-image-container {
                @if view.len() > 1 {
                    div.scroll-arrow.scroll-left { "←" }
                    div.scroll-arrow.scroll-right { "→" }
                }
                div.hero-image-scroll id="heroImageScroll" data-current=(view.current()) {
                    @for (i, image) in data.images.iter().enumerate() {
                        div.hero-image-item {
                            img src=(image.url) alt=(view.alt(i)) title="Click to enlarge";
                            div.hero-image-caption { (image.caption.as_deref().unwrap_or_default()) }
                        }
                    }
                }
                @if view.len() > 1 {
                    div.pagination-dots id="paginationDots" {
                        @for (i, active) in dots.iter().enumerate() {
                            div.pagination-dot.active[*active] data-index=(i) {}
                        }
                    }
                }
            }
            div.text-content {
                @for paragraph in view.paragraphs() {
                    (PreEscaped(render_markdown(paragraph)))
                }
            }
            @if let Some(pdf) = &data.pdf_url {
                div.action-buttons {
                    a.download-button href=(pdf) { "download exhibition pdf" }
                }
            }
        }
        div.lightbox id="lightbox" style=[view.lightbox().is_none().then_some("display: none")] {
            img id="lightbox-img" src=[view.lightbox()] alt="";
        }
        (render_footer(Some(site.footer.as_str())))
    };
    base_document(&data.title, Some("exhibition"), content)
}

// ============================================================================
// Tests
// ============================================================================
