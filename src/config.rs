//! Site configuration module.
//!
//! Handles loading, validating, and merging `docs.toml` files. Configuration
//! is layered: stock defaults are overridden by the site's `docs.toml`, and
//! that in turn by an optional `docs.local.toml` for machine-local tweaks
//! that stay out of version control.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Documentation"       # Site title (header, <title> suffix)
//! default_doc = "introduction"  # Document served at the site root
//! content_roots = ["content"]   # Directories probed for pages, in order
//! default_theme = "light"       # Theme before the visitor picks one
//!
//! [repository]
//! # url = "https://github.com/example/project"
//! # branch = "main"             # Branch edit links point at
//! # content_path = "docs"       # Path prefix inside the repository
//!
//! [colors.light]
//! background = "#ffffff"
//! surface = "#f6f8fa"           # Code blocks, callout tint base
//! text = "#1f2328"
//! text_muted = "#656d76"        # Breadcrumbs, metadata chips
//! border = "#d1d9e0"
//! link = "#0969da"
//!
//! [colors.dark]
//! background = "#0d1117"
//! surface = "#161b22"
//! text = "#e6edf3"
//! text_muted = "#8b949e"
//! border = "#30363d"
//! link = "#4493f8"
//!
//! # Sidebar structure; omit entirely for a flat auto-generated tree.
//! [[nav]]
//! kind = "doc"
//! id = "introduction"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only override the dark background
//! [colors.dark]
//! background = "#000000"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::nav::NavNode;
use crate::theme::ThemeMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `docs.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, shown in the header and as the `<title>` suffix.
    pub title: String,
    /// Document id served at the site root.
    pub default_doc: String,
    /// Directories probed for pages, in priority order.
    pub content_roots: Vec<String>,
    /// Theme before the visitor picks one.
    pub default_theme: ThemeMode,
    /// Source repository, for per-page edit links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryConfig>,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Sidebar structure; empty means a flat auto-generated tree.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nav: Vec<NavNode>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            default_doc: "introduction".to_string(),
            content_roots: vec!["content".to_string()],
            default_theme: ThemeMode::Light,
            repository: None,
            colors: ColorConfig::default(),
            nav: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values before anything downstream trusts them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_doc.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_doc must not be empty".into(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if let Some(repo) = &self.repository {
            if !repo.url.starts_with("http://") && !repo.url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "repository.url must be an http(s) URL, got {:?}",
                    repo.url
                )));
            }
        }
        Ok(())
    }
}

/// Source repository settings for edit links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Repository URL without a trailing slash.
    pub url: String,
    /// Branch edit links point at.
    pub branch: String,
    /// Path prefix of the content directory inside the repository.
    pub content_path: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            branch: "main".to_string(),
            content_path: "content".to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Edit URL for a document id, e.g.
    /// `https://github.com/x/y/edit/main/content/guides/install.mdx`.
    pub fn edit_url(&self, doc_id: &str) -> String {
        let url = self.url.trim_end_matches('/');
        let prefix = self.content_path.trim_matches('/');
        if prefix.is_empty() {
            format!("{url}/edit/{}/{doc_id}.mdx", self.branch)
        } else {
            format!("{url}/edit/{}/{prefix}/{doc_id}.mdx", self.branch)
        }
    }
}

/// Color configuration for light and dark modes.
///
/// Deserialization merges each partial scheme against that mode's own
/// defaults, so `[colors.dark]` overrides never backfill with light values.
#[derive(Debug, Clone, Serialize)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

impl<'de> Deserialize<'de> for ColorConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let partial = PartialColorConfig::deserialize(deserializer)?;
        Ok(Self {
            light: partial.light.apply(ColorScheme::default_light()),
            dark: partial.dark.apply(ColorScheme::default_dark()),
        })
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PartialColorConfig {
    light: PartialColorScheme,
    dark: PartialColorScheme,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PartialColorScheme {
    background: Option<String>,
    surface: Option<String>,
    text: Option<String>,
    text_muted: Option<String>,
    border: Option<String>,
    link: Option<String>,
}

impl PartialColorScheme {
    fn apply(self, mut base: ColorScheme) -> ColorScheme {
        if let Some(v) = self.background {
            base.background = v;
        }
        if let Some(v) = self.surface {
            base.surface = v;
        }
        if let Some(v) = self.text {
            base.text = v;
        }
        if let Some(v) = self.text_muted {
            base.text_muted = v;
        }
        if let Some(v) = self.border {
            base.border = v;
        }
        if let Some(v) = self.link {
            base.link = v;
        }
        base
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Raised surfaces: code blocks, tab bars, callout tint base.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Muted text (breadcrumbs, metadata chips, captions).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Link color.
    pub link: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f6f8fa".to_string(),
            text: "#1f2328".to_string(),
            text_muted: "#656d76".to_string(),
            border: "#d1d9e0".to_string(),
            link: "#0969da".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0d1117".to_string(),
            surface: "#161b22".to_string(),
            text: "#e6edf3".to_string(),
            text_muted: "#8b949e".to_string(),
            border: "#30363d".to_string(),
            link: "#4493f8".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load a named TOML file from a directory as a raw value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path, name: &str) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(name);
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

/// Load config from `docs.toml` (and `docs.local.toml` on top, if present)
/// in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    if let Some(site) = load_raw_config(dir, "docs.toml")? {
        merged = merge_toml(merged, site);
    }
    if let Some(local) = load_raw_config(dir, "docs.local.toml")? {
        merged = merge_toml(merged, local);
    }
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `docs.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# opendocs configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# A docs.local.toml next to this file is merged on top of it, for
# machine-local overrides that stay out of version control.
# Unknown keys will cause an error.

# Site title (header, <title> suffix)
title = "Documentation"

# Document id served at the site root
default_doc = "introduction"

# Directories probed for pages, in priority order.
# Each id maps to <root>/<id>.mdx, then <root>/<id>.md.
content_roots = ["content"]

# Theme before the visitor picks one: "light" or "dark"
default_theme = "light"

# ---------------------------------------------------------------------------
# Source repository (enables per-page "Edit this page" links)
# ---------------------------------------------------------------------------
# [repository]
# url = "https://github.com/example/project"
# branch = "main"
# content_path = "content"

# ---------------------------------------------------------------------------
# Colors - Light mode
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#f6f8fa"       # Code blocks, tab bars, callout tint base
text = "#1f2328"
text_muted = "#656d76"    # Breadcrumbs, metadata chips
border = "#d1d9e0"
link = "#0969da"

# ---------------------------------------------------------------------------
# Colors - Dark mode
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0d1117"
surface = "#161b22"
text = "#e6edf3"
text_muted = "#8b949e"
border = "#30363d"
link = "#4493f8"

# ---------------------------------------------------------------------------
# Sidebar navigation
# ---------------------------------------------------------------------------
# Omit all [[nav]] entries for a flat auto-generated tree.
#
# [[nav]]
# kind = "doc"
# id = "introduction"
#
# [[nav]]
# kind = "section"
# label = "Guides"
#
#   [[nav.children]]
#   kind = "doc"
#   id = "guides/install"
#   label = "Installation"
#
# [[nav]]
# kind = "link"
# label = "GitHub"
# url = "https://github.com/example/project"
"##
}

/// Generate CSS custom properties from color config. Light values sit on
/// `:root`; dark values activate under `[data-theme="dark"]`.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-surface: {light_surface};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
}}

[data-theme="dark"] {{
    --color-bg: {dark_bg};
    --color-surface: {dark_surface};
    --color-text: {dark_text};
    --color-text-muted: {dark_text_muted};
    --color-border: {dark_border};
    --color-link: {dark_link};
}}"#,
        light_bg = colors.light.background,
        light_surface = colors.light.surface,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        dark_bg = colors.dark.background,
        dark_surface = colors.dark.surface,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
    )
}
