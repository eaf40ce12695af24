//! # opendocs
//!
//! A minimal static documentation site generator for MDX-flavored markdown.
//! Pages are plain GFM plus a small set of custom tags — callouts, tab
//! groups, annotated images — that all degrade to readable markdown.
//!
//! # Architecture: Two Rendering Paths
//!
//! Every page can be turned into a document tree two ways:
//!
//! ```text
//! raw text ── directive::parse ──► node tree ── compile ──► Document   (strict)
//!     │                                │
//!     │                                └─ malformed? diagnostics
//!     │
//!     └── preprocess ──► canonical GFM ── render ──► Document          (lenient)
//! ```
//!
//! The strict path ([`compile`]) lowers the structural node tree directly
//! and keeps rich widgets (interactive tab panes). It refuses malformed
//! input. The lenient path ([`preprocess`] + [`render`]) rewrites custom
//! tags to canonical GFM — callouts become marked blockquotes, tabs become
//! headings — and never fails; broken tags stay visible as text. The site
//! build tries strict first and falls back per page, so one author mistake
//! never blanks a page.
//!
//! Both paths share one invariant: fenced code content passes through
//! byte-identical, no matter what tag-like text it contains.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`directive`] | Structural parser for the custom tags, fence-aware, with diagnostics |
//! | [`preprocess`] | Rewrites the node tree to canonical GFM (the lenient path's front half) |
//! | [`render`] | Canonical GFM → typed [`render::Document`] tree via pulldown-cmark |
//! | [`compile`] | Strict node-tree lowering with lenient fallback |
//! | [`frontmatter`] | `---` metadata block parsing (title, description, category) |
//! | [`loader`] | Document id → raw text: content roots, built-in demos, placeholders |
//! | [`theme`] | Light/dark mode, change notification, callout palette |
//! | [`nav`] | Sidebar tree from `docs.toml`, breadcrumbs, id enumeration |
//! | [`config`] | `docs.toml` loading, validation, merging, and CSS generation |
//! | [`emit`] | Document tree → HTML via Maud |
//! | [`site`] | Full build: resolve ids, render pages, write `dist/` + search index |
//! | [`output`] | CLI output formatting for build and check |
//!
//! # Design Decisions
//!
//! ## Structural Parsing Over Regex Rewriting
//!
//! Custom tags are parsed into a small node tree before anything is
//! rewritten. A chain of textual replacements cannot tell a real
//! `<Warning>` from one inside a code fence, and ordering between
//! replacement passes becomes load-bearing. The structural pass captures
//! fences first, matches open/close tags with proper nesting, and makes
//! the fence-content invariant trivial instead of fragile.
//!
//! ## Degradation as a Feature
//!
//! Canonical output is deliberately plain GFM: callouts serialize to
//! `> **Label:** ...` blockquotes and tabs to `###` headings. Any markdown
//! viewer shows something sensible, and preprocessing is idempotent —
//! running it over its own output changes nothing.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than Handlebars or Tera. Malformed HTML is a
//! build error, interpolation is auto-escaped, and there is no template
//! directory to ship or get out of sync.
//!
//! ## Theme-Neutral Static Output
//!
//! Built pages contain no per-theme duplication: colors live in CSS custom
//! properties keyed off a `data-theme` attribute, theme-restricted images
//! are emitted for both modes and shown selectively by CSS, and a few
//! lines of script toggle and persist the attribute. In-process consumers
//! that want a single-mode tree use the filtered render, which drops the
//! mismatched images entirely.
//!
//! The generated site is plain HTML and CSS — drop it on any file server.

pub mod compile;
pub mod config;
pub mod directive;
pub mod emit;
pub mod frontmatter;
pub mod loader;
pub mod nav;
pub mod output;
pub mod preprocess;
pub mod render;
pub mod site;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_helpers;
