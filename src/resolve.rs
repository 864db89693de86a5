//! Symbolic link resolution.
//!
//! Menu links are written relative to the site root (`about/mission.html`)
//! but the page that renders them can sit at any folder depth. Rather than
//! require a declared base path, the resolver builds an ordered list of
//! plausible URLs for the target and probes them one by one until one
//! exists.
//!
//! ## Candidate order
//!
//! For a page at folder depth `d` and a target `T`:
//!
//! 1. Shared-folder form. At the root: `T`, `./T`. When `T` shares its
//!    first `p` folders with the page: `"../" * (d - p) + rest`, and when
//!    the whole page folder is shared also `./rest`.
//! 2. Parent-relative forms `"../" * k + T` for `k = 1..=d`.
//! 3. Site-absolute `/T`.
//! 4. Alias rewrites of `T`'s leading folder, parent-relative then absolute.
//! 5. Deep fallbacks: `T` as written, then one level above the root.
//!
//! Duplicates keep their first position.
//!
//! ## Bounds
//!
//! Each probe is bounded by the probe timeout, the whole sequence by the
//! resolve budget. A timed-out or failed probe counts as a miss. The first
//! success is cached per `(page, target)` for the life of the resolver.

use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, NavigationCache};
use crate::config::NavigationConfig;
use crate::probe::Prober;

/// Where the current page sits in the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    path: String,
    folders: Vec<String>,
}

impl PageLocation {
    /// Parse a site-root path such as `/program/calendar.html`.
    ///
    /// A trailing slash means the path names a folder: `/program/` is at
    /// depth 1, the same as `/program/index.html`. Query and fragment are
    /// ignored.
    pub fn new(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let mut folders: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !path.ends_with('/') {
            folders.pop();
        }
        Self { path, folders }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn depth(&self) -> usize {
        self.folders.len()
    }

    /// Relative URL of the site's home page from here.
    pub fn home_path(&self) -> String {
        format!("{}index.html", up(self.depth()))
    }
}

/// How a link target should be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Empty or `#`: nothing to navigate to.
    Placeholder,
    /// Site-absolute or external; used as-is.
    Absolute(String),
    /// Root-relative symbolic path, leading `./` removed.
    Symbolic(String),
}

pub fn classify(target: &str) -> TargetKind {
    let target = target.trim();
    if target.is_empty() || target == "#" {
        return TargetKind::Placeholder;
    }
    if is_absolute(target) {
        return TargetKind::Absolute(target.to_string());
    }
    let mut symbolic = target;
    while let Some(rest) = symbolic.strip_prefix("./") {
        symbolic = rest;
    }
    if symbolic.is_empty() {
        return TargetKind::Placeholder;
    }
    TargetKind::Symbolic(symbolic.to_string())
}

/// Site-absolute (`/x`, `//host/x`) or carrying a URL scheme.
pub fn is_absolute(target: &str) -> bool {
    if target.starts_with('/') {
        return true;
    }
    match target.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn up(levels: usize) -> String {
    "../".repeat(levels)
}

/// Folder segments of a symbolic target: everything before the last `/`.
fn target_folders(target: &str) -> Vec<&str> {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments
}

/// Ordered, de-duplicated candidate URLs for a symbolic target.
pub fn candidates(
    location: &PageLocation,
    target: &str,
    aliases: &BTreeMap<String, String>,
) -> Vec<String> {
    let d = location.depth();
    let mut out = Vec::new();

    if d == 0 {
        out.push(target.to_string());
        out.push(format!("./{target}"));
    } else {
        let shared = location
            .folders()
            .iter()
            .zip(target_folders(target))
            .take_while(|(a, b)| a.as_str() == *b)
            .count();
        if shared > 0 {
            let rest = target.splitn(shared + 1, '/').last().unwrap_or(target);
            out.push(format!("{}{rest}", up(d - shared)));
            if shared == d {
                out.push(format!("./{rest}"));
            }
        }
    }

    for k in 1..=d {
        out.push(format!("{}{target}", up(k)));
    }
    out.push(format!("/{target}"));

    for (from, to) in aliases {
        if let Some(rest) = target.strip_prefix(from.as_str()).and_then(|r| r.strip_prefix('/')) {
            let rewritten = format!("{}/{rest}", to.trim_end_matches('/'));
            out.push(format!("{}{rewritten}", up(d)));
            out.push(format!("/{rewritten}"));
        }
    }

    out.push(target.to_string());
    out.push(format!("{}{target}", up(d + 1)));

    let mut seen = std::collections::HashSet::new();
    out.retain(|c| seen.insert(c.clone()));
    out
}

/// Resolver tuning, usually taken from `[navigation]`.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub probe_timeout: Duration,
    pub budget: Duration,
    pub base_path: Option<String>,
    pub aliases: BTreeMap<String, String>,
}

impl From<&NavigationConfig> for ResolveOptions {
    fn from(config: &NavigationConfig) -> Self {
        Self {
            probe_timeout: config.probe_timeout(),
            budget: config.resolve_budget(),
            base_path: config.base_path.clone(),
            aliases: config.aliases.clone(),
        }
    }
}

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    /// Absolute target, used unchanged.
    Passthrough,
    /// Joined onto the declared base path.
    Declared,
    Cache,
    Probe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { url: String, via: Via },
    /// Placeholder target, or every candidate failed.
    NotFound,
    /// The caller stopped caring before resolution finished.
    Cancelled,
}

/// Outcome of probing one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Found,
    Missing,
    TimedOut,
    Failed(String),
}

/// Progress report sent for every probe issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEvent {
    pub target: String,
    pub candidate: String,
    pub status: ProbeStatus,
}

/// Resolves symbolic targets for one page.
#[derive(Debug)]
pub struct Resolver<P> {
    prober: P,
    location: PageLocation,
    options: ResolveOptions,
    cache: Mutex<NavigationCache>,
    events: Option<Sender<ProbeEvent>>,
    probes_issued: AtomicUsize,
}

impl<P: Prober> Resolver<P> {
    pub fn new(prober: P, location: PageLocation, options: ResolveOptions) -> Self {
        Self {
            prober,
            location,
            options,
            cache: Mutex::new(NavigationCache::new()),
            events: None,
            probes_issued: AtomicUsize::new(0),
        }
    }

    /// Report every probe on `sender`. Send failures are ignored.
    pub fn with_events(mut self, sender: Sender<ProbeEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Candidate list for `target`; empty unless the target is symbolic.
    pub fn candidates(&self, target: &str) -> Vec<String> {
        match classify(target) {
            TargetKind::Symbolic(t) => candidates(&self.location, &t, &self.options.aliases),
            _ => Vec::new(),
        }
    }

    pub fn probes_issued(&self) -> usize {
        self.probes_issued.load(Ordering::Relaxed)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats().clone()
    }

    pub fn cache_entries(&self) -> Vec<CacheEntry> {
        self.lock_cache().entries().to_vec()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, NavigationCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// URL of the site home page from here, before verification.
    pub fn home_url(&self) -> String {
        match &self.options.base_path {
            Some(base) => join_base(base, "index.html"),
            None => self.location.home_path(),
        }
    }

    pub async fn resolve(&self, target: &str) -> Resolution {
        self.resolve_while(target, || true).await
    }

    /// Resolve `target`, giving up with [`Resolution::Cancelled`] as soon
    /// as `live` returns false. `live` is checked before every probe and
    /// after the last one.
    pub async fn resolve_while(&self, target: &str, live: impl Fn() -> bool) -> Resolution {
        let symbolic = match classify(target) {
            TargetKind::Placeholder => {
                debug!(link = target, "placeholder link, nothing to resolve");
                return Resolution::NotFound;
            }
            TargetKind::Absolute(url) => {
                return Resolution::Resolved {
                    url,
                    via: Via::Passthrough,
                };
            }
            TargetKind::Symbolic(t) => t,
        };

        if let Some(base) = &self.options.base_path {
            return Resolution::Resolved {
                url: join_base(base, &symbolic),
                via: Via::Declared,
            };
        }

        if let Some(url) = self.lock_cache().get(self.location.path(), &symbolic) {
            debug!(link = %symbolic, %url, "cache hit");
            return Resolution::Resolved {
                url,
                via: Via::Cache,
            };
        }

        let started = Instant::now();
        let list = candidates(&self.location, &symbolic, &self.options.aliases);
        for candidate in list {
            if !live() {
                return Resolution::Cancelled;
            }
            let remaining = self.options.budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                warn!(link = %symbolic, "resolve budget spent, skipping remaining candidates");
                break;
            }
            let limit = self.options.probe_timeout.min(remaining);
            let status = self.probe_candidate(&symbolic, &candidate, limit).await;
            if status == ProbeStatus::Found {
                self.lock_cache()
                    .insert(self.location.path(), &symbolic, candidate.clone());
                if !live() {
                    return Resolution::Cancelled;
                }
                return Resolution::Resolved {
                    url: candidate,
                    via: Via::Probe,
                };
            }
        }

        if !live() {
            return Resolution::Cancelled;
        }
        debug!(link = %symbolic, "no candidate resolved");
        Resolution::NotFound
    }

    /// Probe a single URL under the probe timeout.
    pub async fn verify(&self, url: &str) -> bool {
        self.probe_candidate(url, url, self.options.probe_timeout)
            .await
            == ProbeStatus::Found
    }

    async fn probe_candidate(&self, target: &str, candidate: &str, limit: Duration) -> ProbeStatus {
        self.probes_issued.fetch_add(1, Ordering::Relaxed);
        let status = match tokio::time::timeout(limit, self.prober.probe(candidate)).await {
            Ok(Ok(true)) => ProbeStatus::Found,
            Ok(Ok(false)) => ProbeStatus::Missing,
            Ok(Err(e)) => ProbeStatus::Failed(e.to_string()),
            Err(_) => ProbeStatus::TimedOut,
        };
        debug!(link = target, candidate, ?status, "probe");
        if let Some(events) = &self.events {
            let _ = events.send(ProbeEvent {
                target: target.to_string(),
                candidate: candidate.to_string(),
                status: status.clone(),
            });
        }
        status
    }
}

fn join_base(base: &str, target: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{target}")
    } else {
        format!("{base}/{target}")
    }
}
