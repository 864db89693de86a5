//! Link clicks to page loads.
//!
//! A [`Navigator`] owns the page's [`Resolver`] and the window location.
//! It turns a clicked menu link into exactly one location assignment, or
//! none: placeholders are ignored, absolute links are left to the browser,
//! and symbolic links are resolved by probing before the page moves.
//!
//! ```text
//!            navigate(T)                 resolved
//!   Idle ───────────────▶ Probing(T) ──────────────▶ assign(url), Idle
//!    ▲                      │  │  navigate(T)  → Busy
//!    │    go_home / cancel  │  │  navigate(T') → Probing(T'), T superseded
//!    └──────────────────────┘  └─ exhausted   → policy: assign(T) | overlay
//! ```
//!
//! Only one navigation is live at a time. Each one takes a generation
//! number; a probe sequence that finishes after a newer navigation started
//! is discarded without touching the location.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::FallbackPolicy;
use crate::page::Page;
use crate::probe::Prober;
use crate::resolve::{Resolution, Resolver, TargetKind, Via, classify};

/// The window location: the one side effect navigation has.
pub trait LocationSink {
    fn assign(&self, url: &str);
}

/// The click that triggered a navigation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NavEvent {
    default_prevented: bool,
}

impl NavEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Probing { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// Empty or `#` target.
    Ignored,
    /// Absolute target on a click; the browser follows the link itself.
    Native { url: String },
    /// The location was assigned a resolved URL.
    Navigated { url: String, via: Via },
    /// Nothing resolved; the location was assigned the unverified target.
    Fallback { url: String },
    /// Nothing resolved; the page should show a not-found notice.
    NotFound { target: String },
    /// The same target is already being resolved.
    Busy,
    /// A newer navigation took over before this one finished.
    Superseded,
}

#[derive(Debug)]
struct NavState {
    generation: u64,
    phase: NavPhase,
}

pub struct Navigator<P, L> {
    resolver: Resolver<P>,
    location: L,
    policy: FallbackPolicy,
    state: Mutex<NavState>,
}

impl<P: Prober, L: LocationSink> Navigator<P, L> {
    pub fn new(resolver: Resolver<P>, location: L, policy: FallbackPolicy) -> Self {
        Self {
            resolver,
            location,
            policy,
            state: Mutex::new(NavState {
                generation: 0,
                phase: NavPhase::Idle,
            }),
        }
    }

    pub fn resolver(&self) -> &Resolver<P> {
        &self.resolver
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn phase(&self) -> NavPhase {
        self.lock().phase.clone()
    }

    pub fn is_probing(&self) -> bool {
        matches!(self.lock().phase, NavPhase::Probing { .. })
    }

    fn lock(&self) -> MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Start a new generation, superseding whatever is in flight.
    fn begin(&self, phase: NavPhase) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.phase = phase;
        state.generation
    }

    /// Navigate to a link target.
    ///
    /// With an `event`, the click's default action is prevented for every
    /// target this navigator handles itself.
    pub async fn navigate(&self, target: &str, event: Option<&mut NavEvent>) -> NavigateOutcome {
        let symbolic = match classify(target) {
            TargetKind::Placeholder => {
                if let Some(event) = event {
                    event.prevent_default();
                }
                return NavigateOutcome::Ignored;
            }
            TargetKind::Absolute(url) => {
                if event.is_some() {
                    return NavigateOutcome::Native { url };
                }
                self.begin(NavPhase::Idle);
                self.location.assign(&url);
                return NavigateOutcome::Navigated {
                    url,
                    via: Via::Passthrough,
                };
            }
            TargetKind::Symbolic(t) => t,
        };
        if let Some(event) = event {
            event.prevent_default();
        }

        let generation = {
            let mut state = self.lock();
            if let NavPhase::Probing { target: current } = &state.phase
                && *current == symbolic
            {
                debug!(link = %symbolic, "already resolving, click ignored");
                return NavigateOutcome::Busy;
            }
            state.generation += 1;
            state.phase = NavPhase::Probing {
                target: symbolic.clone(),
            };
            state.generation
        };

        let resolution = self
            .resolver
            .resolve_while(&symbolic, || self.is_current(generation))
            .await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(link = %symbolic, "navigation superseded");
            return NavigateOutcome::Superseded;
        }
        state.phase = NavPhase::Idle;

        match resolution {
            Resolution::Resolved { url, via } => {
                info!(link = %symbolic, %url, ?via, "navigating");
                self.location.assign(&url);
                NavigateOutcome::Navigated { url, via }
            }
            Resolution::Cancelled => NavigateOutcome::Superseded,
            Resolution::NotFound => match self.policy {
                FallbackPolicy::Direct => {
                    warn!(link = %symbolic, "no candidate resolved, navigating unverified");
                    self.location.assign(&symbolic);
                    NavigateOutcome::Fallback { url: symbolic }
                }
                FallbackPolicy::Overlay => {
                    warn!(link = %symbolic, "no candidate resolved");
                    NavigateOutcome::NotFound { target: symbolic }
                }
            },
        }
    }

    /// Navigate to the site home page, superseding any navigation in
    /// flight. Falls back to `/` when the computed home does not verify.
    pub async fn go_home(&self) -> NavigateOutcome {
        let generation = self.begin(NavPhase::Idle);
        let home = self.resolver.home_url();
        let verified = self.resolver.verify(&home).await;

        let state = self.lock();
        if state.generation != generation {
            return NavigateOutcome::Superseded;
        }
        if verified {
            info!(url = %home, "navigating home");
            self.location.assign(&home);
            NavigateOutcome::Navigated {
                url: home,
                via: Via::Probe,
            }
        } else {
            warn!(url = %home, "home page did not verify, using site root");
            self.location.assign("/");
            NavigateOutcome::Fallback { url: "/".into() }
        }
    }

    /// Abandon the navigation in flight, if any.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if state.phase == NavPhase::Idle {
            return false;
        }
        state.generation += 1;
        state.phase = NavPhase::Idle;
        true
    }
}

/// Reflect a navigation outcome on the page. Returns whether the page
/// changed.
pub fn apply_outcome(page: &mut Page, outcome: &NavigateOutcome) -> bool {
    match outcome {
        NavigateOutcome::NotFound { target } => {
            page.show_not_found(target);
            true
        }
        NavigateOutcome::Navigated { .. } | NavigateOutcome::Fallback { .. } => {
            page.dismiss_overlay()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::time::Duration;

    fn navigator(
        prober: FakeProber,
        location: &str,
        policy: FallbackPolicy,
    ) -> Navigator<FakeProber, RecordingLocation> {
        Navigator::new(resolver(prober, location), RecordingLocation::default(), policy)
    }

    #[tokio::test(start_paused = true)]
    async fn cross_folder_link_from_subfolder() {
        let prober = FakeProber::with_existing(&["../about/mission.html", "/about/mission.html"]);
        let nav = navigator(prober, "/program/calendar.html", FallbackPolicy::Direct);
        let mut event = NavEvent::new();

        let outcome = nav.navigate("about/mission.html", Some(&mut event)).await;

        assert_eq!(
            outcome,
            NavigateOutcome::Navigated {
                url: "../about/mission.html".into(),
                via: Via::Probe
            }
        );
        assert!(event.default_prevented());
        assert_eq!(nav.location().assigned(), ["../about/mission.html"]);
        assert_eq!(nav.resolver().prober().probe_count(), 1);
        assert_eq!(nav.phase(), NavPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn placeholder_link_is_ignored() {
        let nav = navigator(FakeProber::default(), "/program/calendar.html", FallbackPolicy::Direct);
        let mut event = NavEvent::new();
        assert_eq!(nav.navigate("#", Some(&mut event)).await, NavigateOutcome::Ignored);
        assert_eq!(nav.navigate("", None).await, NavigateOutcome::Ignored);
        assert!(event.default_prevented());
        assert_eq!(nav.resolver().probes_issued(), 0);
        assert!(nav.location().assigned().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn absolute_click_left_to_browser() {
        let nav = navigator(FakeProber::default(), "/program/calendar.html", FallbackPolicy::Direct);
        let mut event = NavEvent::new();
        let outcome = nav
            .navigate("https://example.org/donate", Some(&mut event))
            .await;
        assert_eq!(
            outcome,
            NavigateOutcome::Native {
                url: "https://example.org/donate".into()
            }
        );
        assert!(!event.default_prevented());
        assert!(nav.location().assigned().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn absolute_programmatic_navigation_assigns() {
        let nav = navigator(FakeProber::default(), "/program/calendar.html", FallbackPolicy::Direct);
        nav.navigate("/about/mission.html", None).await;
        assert_eq!(nav.location().assigned(), ["/about/mission.html"]);
        assert_eq!(nav.resolver().probes_issued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_navigation_is_served_from_cache() {
        let prober = FakeProber::with_existing(&["../about/mission.html"]);
        let nav = navigator(prober, "/program/calendar.html", FallbackPolicy::Direct);

        nav.navigate("about/mission.html", None).await;
        let probes = nav.resolver().probes_issued();
        let outcome = nav.navigate("about/mission.html", None).await;

        assert_eq!(
            outcome,
            NavigateOutcome::Navigated {
                url: "../about/mission.html".into(),
                via: Via::Cache
            }
        );
        assert_eq!(nav.resolver().probes_issued(), probes);
        assert_eq!(
            nav.location().assigned(),
            ["../about/mission.html", "../about/mission.html"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_direct_policy_assigns_target() {
        let nav = navigator(FakeProber::default(), "/program/calendar.html", FallbackPolicy::Direct);
        assert_eq!(
            nav.navigate("about/gone.html", None).await,
            NavigateOutcome::Fallback {
                url: "about/gone.html".into()
            }
        );
        assert_eq!(nav.location().assigned(), ["about/gone.html"]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_overlay_policy_stays_put() {
        let nav = navigator(FakeProber::default(), "/program/calendar.html", FallbackPolicy::Overlay);
        let outcome = nav.navigate("about/gone.html", None).await;
        assert_eq!(
            outcome,
            NavigateOutcome::NotFound {
                target: "about/gone.html".into()
            }
        );
        assert!(nav.location().assigned().is_empty());

        let mut page = page_with_carousels(&[]);
        assert!(apply_outcome(&mut page, &outcome));
        let overlay = page.overlay.as_ref().unwrap();
        assert_eq!(overlay.message, "Page not found: about/gone.html");
    }

    #[tokio::test(start_paused = true)]
    async fn same_target_while_probing_is_busy() {
        let prober = FakeProber::with_existing(&["../about/mission.html"])
            .delay_all(Duration::from_millis(300));
        let nav = navigator(prober, "/program/calendar.html", FallbackPolicy::Direct);

        let first = nav.navigate("about/mission.html", None);
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(nav.is_probing());
            nav.navigate("about/mission.html", None).await
        };
        let (a, b) = tokio::join!(first, second);

        assert!(matches!(a, NavigateOutcome::Navigated { .. }));
        assert_eq!(b, NavigateOutcome::Busy);
        assert_eq!(nav.location().assigned(), ["../about/mission.html"]);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_target_supersedes_stale_probe() {
        let prober = FakeProber::with_existing(&[
            "../about/mission.html",
            "../supportus/supportus.html",
        ])
        .delay_all(Duration::from_millis(300));
        let nav = navigator(prober, "/program/calendar.html", FallbackPolicy::Direct);

        let first = nav.navigate("about/mission.html", None);
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            nav.navigate("supportus/supportus.html", None).await
        };
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a, NavigateOutcome::Superseded);
        assert_eq!(
            b,
            NavigateOutcome::Navigated {
                url: "../supportus/supportus.html".into(),
                via: Via::Probe
            }
        );
        assert_eq!(nav.location().assigned(), ["../supportus/supportus.html"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_in_flight_result() {
        let prober = FakeProber::with_existing(&["../about/mission.html"])
            .delay_all(Duration::from_millis(300));
        let nav = navigator(prober, "/program/calendar.html", FallbackPolicy::Direct);

        let first = nav.navigate("about/mission.html", None);
        let canceller = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            nav.cancel()
        };
        let (outcome, cancelled) = tokio::join!(first, canceller);

        assert!(cancelled);
        assert_eq!(outcome, NavigateOutcome::Superseded);
        assert!(nav.location().assigned().is_empty());
        assert!(!nav.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn go_home_verifies_relative_index() {
        let prober = FakeProber::with_existing(&["../index.html"]);
        let nav = navigator(prober, "/about/team.html", FallbackPolicy::Direct);
        assert_eq!(
            nav.go_home().await,
            NavigateOutcome::Navigated {
                url: "../index.html".into(),
                via: Via::Probe
            }
        );
        assert_eq!(nav.resolver().prober().probed(), ["../index.html"]);
    }

    #[tokio::test(start_paused = true)]
    async fn go_home_falls_back_to_root() {
        let nav = navigator(FakeProber::default(), "/about/team.html", FallbackPolicy::Direct);
        assert_eq!(
            nav.go_home().await,
            NavigateOutcome::Fallback { url: "/".into() }
        );
        assert_eq!(nav.location().assigned(), ["/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn go_home_from_root_page() {
        let prober = FakeProber::with_existing(&["index.html"]);
        let nav = navigator(prober, "/index.html", FallbackPolicy::Direct);
        nav.go_home().await;
        assert_eq!(nav.location().assigned(), ["index.html"]);
    }

    #[test]
    fn successful_navigation_clears_overlay() {
        let mut page = page_with_carousels(&[]);
        page.show_not_found("about/gone.html");
        let outcome = NavigateOutcome::Navigated {
            url: "../index.html".into(),
            via: Via::Probe,
        };
        assert!(apply_outcome(&mut page, &outcome));
        assert!(page.overlay.is_none());
        assert!(!apply_outcome(&mut page, &NavigateOutcome::Busy));
    }
}
