//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. User values are
//! layered over stock defaults, so a config file only needs the keys it
//! wants to change.
//!
//! ## Config File Location
//!
//! `site.toml` lives in the config directory (`--config`, default `.`):
//!
//! ```text
//! site/
//! ├── site.toml                 # Optional, overrides stock defaults
//! ├── fellowship-data.json      # Content document
//! ├── navigation-data.json      # Optional menu override
//! ├── index.html
//! ├── about/
//! └── program/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "initial research"  # Banner title; clicking it goes home
//! footer = "124 Gallery Street, New York, NY 10001"
//!
//! [carousel]
//! interval_ms = 4000          # Auto-advance period
//! placeholder = "data:image/svg+xml,..."  # Shown when an image fails
//!
//! [navigation]
//! probe_timeout_ms = 800      # Bound on a single existence probe
//! resolve_budget_ms = 2500    # Bound on a whole probe sequence
//! # base_path = "/"           # Declared site root; disables probing
//! on_not_found = "direct"     # "direct" or "overlay"
//!
//! [navigation.aliases]
//! # uploads = "fellowship/2025-cohort"
//!
//! [content]
//! fellowship_data = "/fellowship-data.json"
//! exhibition_data = "/exhibition-data.json"
//! # navigation_data = "/navigation-data.json"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILENAME: &str = "site.toml";

/// Inline SVG shown in place of an image that failed to load.
pub const DEFAULT_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%22300%22 height=%22200%22 viewBox=%220 0 300 200%22%3E%3Crect width=%22300%22 height=%22200%22 fill=%22%23f0f0f0%22/%3E%3Ctext x=%2250%25%22 y=%2250%25%22 dominant-baseline=%22middle%22 text-anchor=%22middle%22 font-family=%22sans-serif%22 font-size=%2218%22 fill=%22%23999%22%3EImage Not Found%3C/text%3E%3C/svg%3E";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Page chrome shared by every page.
    pub site: SiteSection,
    /// Carousel rotation settings.
    pub carousel: CarouselConfig,
    /// Link resolution and fallback settings.
    pub navigation: NavigationConfig,
    /// Where the JSON documents live, as site-root paths.
    pub content: ContentConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be greater than 0".into(),
            ));
        }
        if self.carousel.placeholder.trim().is_empty() {
            return Err(ConfigError::Validation(
                "carousel.placeholder must not be empty".into(),
            ));
        }
        if self.navigation.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "navigation.probe_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.navigation.resolve_budget_ms < self.navigation.probe_timeout_ms {
            return Err(ConfigError::Validation(
                "navigation.resolve_budget_ms must be at least probe_timeout_ms".into(),
            ));
        }
        if let Some(base) = &self.navigation.base_path
            && !base.starts_with('/')
            && !base.contains("://")
        {
            return Err(ConfigError::Validation(
                "navigation.base_path must be absolute (\"/...\" or a full URL)".into(),
            ));
        }
        for (from, to) in &self.navigation.aliases {
            if from.is_empty() || to.is_empty() || from.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "navigation.aliases: invalid alias {from:?} = {to:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Page chrome settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Banner title shown above the menu.
    pub title: String,
    /// Footer text, inserted once per page when the page has none.
    pub footer: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "initial research".to_string(),
            footer: "124 Gallery Street, New York, NY 10001".to_string(),
        }
    }
}

/// Carousel rotation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Auto-advance period in milliseconds.
    pub interval_ms: u64,
    /// Image source swapped in, once, when a slide image fails to load.
    pub placeholder: String,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: 4000,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// What a navigator does when every candidate probe fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Navigate to the original target unverified.
    #[default]
    Direct,
    /// Stay on the page and show a dismissible "page not found" overlay.
    Overlay,
}

/// Link resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Upper bound for a single existence probe.
    pub probe_timeout_ms: u64,
    /// Upper bound for a whole probe sequence; remaining candidates are
    /// skipped once it is spent.
    pub resolve_budget_ms: u64,
    /// Declared site root. When set, targets are joined onto it and no
    /// probes are issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Behavior when resolution is exhausted.
    pub on_not_found: FallbackPolicy,
    /// Leading-folder aliases: `uploads = "fellowship/2025-cohort"` adds
    /// candidates with `uploads/` rewritten.
    pub aliases: BTreeMap<String, String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 800,
            resolve_budget_ms: 2500,
            base_path: None,
            on_not_found: FallbackPolicy::Direct,
            aliases: BTreeMap::new(),
        }
    }
}

impl NavigationConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn resolve_budget(&self) -> Duration {
        Duration::from_millis(self.resolve_budget_ms)
    }
}

/// Site-root paths of the JSON documents the page consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    pub fellowship_data: String,
    pub exhibition_data: String,
    /// Menu document. Absent means the built-in default menu.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_data: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            fellowship_data: "/fellowship-data.json".to_string(),
            exhibition_data: "/exhibition-data.json".to_string(),
            navigation_data: None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `site.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-kit configuration
# =========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page chrome
# ---------------------------------------------------------------------------
[site]
# Banner title. Clicking it navigates to the site home page.
title = "initial research"

# Footer inserted at the end of every page that has none.
footer = "124 Gallery Street, New York, NY 10001"

# ---------------------------------------------------------------------------
# Carousels
# ---------------------------------------------------------------------------
[carousel]
# Auto-advance period in milliseconds. Manual dot/arrow clicks restart it.
interval_ms = 4000

# Image shown, once, when a slide image fails to load. The default is an
# inline grey "Image Not Found" SVG.
# placeholder = "/img/placeholder.png"

# ---------------------------------------------------------------------------
# Cross-folder navigation
# ---------------------------------------------------------------------------
[navigation]
# Bound on a single HEAD probe, in milliseconds. A timed-out probe counts
# as a failed candidate.
probe_timeout_ms = 800

# Bound on the whole probe sequence for one link, in milliseconds.
resolve_budget_ms = 2500

# Declared site root. When set, links are joined onto it directly and no
# probes are issued. Prefer this when the deployment layout is known.
# base_path = "/"

# What happens when no candidate resolves:
#   "direct"  - navigate to the link as written, unverified
#   "overlay" - stay on the page and show a dismissible "not found" notice
on_not_found = "direct"

# Leading-folder aliases tried after the regular candidates.
[navigation.aliases]
# uploads = "fellowship/2025-cohort"

# ---------------------------------------------------------------------------
# Content documents (site-root paths)
# ---------------------------------------------------------------------------
[content]
fellowship_data = "/fellowship-data.json"
exhibition_data = "/exhibition-data.json"
# navigation_data = "/navigation-data.json"
"##
}
