//! # gallery-kit
//!
//! Page behavior for a small static gallery site: image carousels that
//! rotate on their own, and menu links that work from any page no matter
//! how deep it sits in the folder tree.
//!
//! # Architecture
//!
//! The browser is modelled, not embedded. A page is a plain data model
//! ([`page::Page`]) that the carousel engine and navigator mutate through
//! narrow seams, and [`render`] turns it into HTML. Everything that touches
//! the outside world sits behind a trait:
//!
//! ```text
//!   ContentSource ──▶ content ──▶ Page ◀── CarouselEngine ◀── TimerQueue
//!                                  ▲
//!   Prober ──▶ Resolver ──▶ Navigator ──▶ LocationSink
//! ```
//!
//! - [`content::ContentSource`]: where JSON documents come from (disk or HTTP)
//! - [`probe::Prober`]: does a URL exist (HEAD request or file lookup)
//! - [`navigate::LocationSink`]: the window location
//! - [`carousel::CarouselDom`]: the carousel containers on the page
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`carousel`] | Carousel registry: slide state, auto-advance timers, manual control |
//! | [`clock`] | Virtual-time timer queue driving carousel rotation |
//! | [`resolve`] | Candidate URL generation and sequential probing with budgets |
//! | [`cache`] | Per-page cache of resolved targets |
//! | [`probe`] | HTTP and filesystem existence probes |
//! | [`navigate`] | Click handling: one live navigation, supersession, fallback policy |
//! | [`page`] | Page model: fellows table, carousels, images, overlay, footer |
//! | [`content`] | JSON loading and Markdown bios |
//! | [`menu`] | Menu items, dropdowns, mobile panel |
//! | [`exhibition`] | Exhibition strip, lightbox, keyboard control |
//! | [`session`] | One page load: bootstrap and event dispatch |
//! | [`render`] | HTML rendering with Maud |
//! | [`check`] | Whole-site link check against a built site on disk |
//! | [`config`] | `site.toml` loading, merging, validation |
//! | [`types`] | Content document types shared with the site's JSON files |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Probing Instead of a Base Path
//!
//! Sites are copied between hosts and subfolders without a build step, so
//! the page cannot know its own base path. The resolver guesses in a fixed
//! order and asks the server. A declared `base_path` skips probing entirely
//! for sites that do know.
//!
//! ## Virtual Time for Carousels
//!
//! Carousel timers run on a [`clock::TimerQueue`] advanced by the caller
//! rather than on wall-clock tasks. Rotation is deterministic in tests and
//! a destroyed carousel cannot leave a stray timer behind.

pub mod cache;
pub mod carousel;
pub mod check;
pub mod clock;
pub mod config;
pub mod content;
pub mod exhibition;
pub mod menu;
pub mod navigate;
pub mod output;
pub mod page;
pub mod probe;
pub mod render;
pub mod resolve;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
