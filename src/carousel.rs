//! Carousel engine: rotation state and auto-advance for image carousels.
//!
//! The engine is an explicit registry of [`CarouselState`]s, one per live
//! carousel container, plus the timers that rotate them. Handlers get it by
//! `&mut`, so there is exactly one writer at a time. The document itself is
//! reached through [`CarouselDom`]; the engine never assumes a container it
//! knows about still exists.
//!
//! ## Invariants
//!
//! - Exactly one slide and one dot (when dots exist) are active, at the
//!   carousel's `current_index`.
//! - A carousel with one slide (or none) never owns a timer and gets no
//!   state entry; its only slide is simply marked active.
//! - At most one timer per carousel: (re)initializing clears any prior one.
//!
//! ## Index movement
//!
//! Only the auto-advance tick wraps (`(i + 1) % n`). Manual moves
//! ([`CarouselEngine::go_to`], [`CarouselEngine::select`],
//! [`CarouselEngine::step`]) reject out-of-range targets and leave the state
//! untouched. Manual moves by the user (`select`, `step`) restart the timer
//! so the rotation waits a full interval after the click.

use crate::clock::{TimerId, TimerQueue};
use crate::config::CarouselConfig;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

/// The document operations the engine needs.
pub trait CarouselDom {
    /// Ids of every carousel container in the document, in document order.
    fn carousel_ids(&self) -> Vec<String>;

    /// Slide count of a container, or `None` when it is not in the document.
    fn slide_count(&self, id: &str) -> Option<usize>;

    /// Mark slide and dot `index` active and all others inactive. Returns
    /// false, changing nothing, when the container is missing or `index` is
    /// out of range.
    fn show_slide(&mut self, id: &str, index: usize) -> bool;
}

/// Rotation state of one carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselState {
    pub id: String,
    pub current_index: usize,
    pub total_slides: usize,
    timer: Option<TimerId>,
}

impl CarouselState {
    /// Whether auto-advance is running.
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }
}

/// Registry of live carousels and their auto-advance timers.
#[derive(Debug)]
pub struct CarouselEngine {
    interval: Duration,
    states: BTreeMap<String, CarouselState>,
    owners: HashMap<TimerId, String>,
    timers: TimerQueue,
}

impl CarouselEngine {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            states: BTreeMap::new(),
            owners: HashMap::new(),
            timers: TimerQueue::new(),
        }
    }

    pub fn from_config(config: &CarouselConfig) -> Self {
        Self::new(config.interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self, id: &str) -> Option<&CarouselState> {
        self.states.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of armed auto-advance timers.
    pub fn running_count(&self) -> usize {
        self.timers.armed_count()
    }

    /// Virtual time of the engine's clock in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Initialize every carousel container in the document.
    ///
    /// Returns the number of carousels now rotating.
    pub fn init_all(&mut self, dom: &mut impl CarouselDom) -> usize {
        let ids = dom.carousel_ids();
        self.init_ids(dom, &ids)
    }

    /// Initialize the given carousels, e.g. after their section expanded.
    ///
    /// Each one starts at slide 0. Re-initializing a known id replaces its
    /// state and timer rather than adding a second timer.
    pub fn init_ids(&mut self, dom: &mut impl CarouselDom, ids: &[String]) -> usize {
        let mut started = 0;
        for id in ids {
            if self.init_one(dom, id) {
                started += 1;
            }
        }
        started
    }

    fn init_one(&mut self, dom: &mut impl CarouselDom, id: &str) -> bool {
        self.remove(id);

        let Some(total) = dom.slide_count(id) else {
            debug!(carousel = id, "container not in document, skipping");
            return false;
        };
        if total == 0 {
            return false;
        }
        dom.show_slide(id, 0);
        if total == 1 {
            return false;
        }

        let timer = self.arm(id);
        self.states.insert(
            id.to_string(),
            CarouselState {
                id: id.to_string(),
                current_index: 0,
                total_slides: total,
                timer: Some(timer),
            },
        );
        debug!(carousel = id, slides = total, "carousel initialized");
        true
    }

    /// Show slide `index`. Out-of-range indices and unknown or stale
    /// carousels are ignored. The timer is left alone.
    pub fn go_to(&mut self, dom: &mut impl CarouselDom, id: &str, index: usize) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        if index >= state.total_slides {
            return false;
        }
        if !dom.show_slide(id, index) {
            debug!(carousel = id, "stale carousel, ignoring go_to");
            return false;
        }
        state.current_index = index;
        true
    }

    /// Manual jump (dot click): [`go_to`](Self::go_to), then restart a
    /// running timer so the next auto-advance is a full interval away.
    pub fn select(&mut self, dom: &mut impl CarouselDom, id: &str, index: usize) -> bool {
        if !self.go_to(dom, id, index) {
            return false;
        }
        if self.states.get(id).is_some_and(CarouselState::is_running) {
            self.clear_timer(id);
            let timer = self.arm(id);
            if let Some(state) = self.states.get_mut(id) {
                state.timer = Some(timer);
            }
        }
        true
    }

    /// Manual previous/next (arrow click). Does not wrap at either end.
    pub fn step(&mut self, dom: &mut impl CarouselDom, id: &str, delta: isize) -> bool {
        let Some(state) = self.states.get(id) else {
            return false;
        };
        match state.current_index.checked_add_signed(delta) {
            Some(target) => self.select(dom, id, target),
            None => false,
        }
    }

    /// Stop auto-advance for one carousel. Returns whether a timer was
    /// running.
    pub fn pause(&mut self, id: &str) -> bool {
        self.clear_timer(id)
    }

    /// Stop auto-advance everywhere. Entries are kept so they can resume.
    pub fn pause_all(&mut self) -> usize {
        let ids: Vec<String> = self.states.keys().cloned().collect();
        ids.iter().filter(|id| self.clear_timer(id)).count()
    }

    /// Restart auto-advance from the current index. No-op when already
    /// running or unknown.
    pub fn resume(&mut self, id: &str) -> bool {
        match self.states.get(id) {
            Some(state) if !state.is_running() && state.total_slides > 1 => {}
            _ => return false,
        }
        let timer = self.arm(id);
        if let Some(state) = self.states.get_mut(id) {
            state.timer = Some(timer);
        }
        true
    }

    /// Destroy carousels whose section collapsed: timers cleared, entries
    /// evicted. Returns how many were known.
    pub fn evict(&mut self, ids: &[String]) -> usize {
        ids.iter().filter(|id| self.remove(id)).count()
    }

    /// Advance the clock, running every auto-advance tick that falls due.
    ///
    /// Returns the number of ticks that moved a carousel.
    /// Long jumps skip whole rotations: each running carousel still shows
    /// between one and `total_slides` ticks, and lands on the same slide it
    /// would have reached tick by tick.
    pub fn advance(&mut self, dom: &mut impl CarouselDom, by: Duration) -> usize {
        let by_ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let until = self.timers.now_ms().saturating_add(by_ms);
        let mut moved = self.skip_rotations(until);
        while let Some(timer) = self.timers.pop_due(until) {
            match self.owners.get(&timer).cloned() {
                Some(id) => {
                    if self.tick(dom, &id) {
                        moved = moved.saturating_add(1);
                    }
                }
                None => {
                    self.timers.cancel(timer);
                }
            }
        }
        moved
    }

    fn skip_rotations(&mut self, until_ms: u64) -> usize {
        let mut skipped = 0usize;
        for state in self.states.values() {
            let Some(timer) = state.timer else {
                continue;
            };
            let slides = state.total_slides.max(1) as u64;
            let due = self.timers.due_count(timer, until_ms);
            let skip = due.saturating_sub(1) / slides * slides;
            if skip > 0 {
                self.timers.skip(timer, skip);
                skipped = skipped.saturating_add(usize::try_from(skip).unwrap_or(usize::MAX));
            }
        }
        skipped
    }

    fn tick(&mut self, dom: &mut impl CarouselDom, id: &str) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        let next = (state.current_index + 1) % state.total_slides;
        if dom.show_slide(id, next) {
            state.current_index = next;
            true
        } else {
            debug!(carousel = id, "container gone, evicting stale carousel");
            self.remove(id);
            false
        }
    }

    fn arm(&mut self, id: &str) -> TimerId {
        let timer = self.timers.arm(self.interval);
        self.owners.insert(timer, id.to_string());
        timer
    }

    fn clear_timer(&mut self, id: &str) -> bool {
        let Some(timer) = self.states.get_mut(id).and_then(|s| s.timer.take()) else {
            return false;
        };
        self.owners.remove(&timer);
        self.timers.cancel(timer)
    }

    fn remove(&mut self, id: &str) -> bool {
        self.clear_timer(id);
        self.states.remove(id).is_some()
    }
}
