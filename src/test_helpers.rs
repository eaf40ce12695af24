//! Shared test utilities for the opendocs test suite.
//!
//! Provides temp project scaffolding and lookup helpers used by the build
//! and emission tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = project(r#"default_doc = "home""#);
//! write_doc(&tmp, "home.md", "# Home\n");
//!
//! let summary = site::build(tmp.path(), &tmp.path().join("dist")).unwrap();
//! let page = find_report(&summary, "home");
//! assert!(!page.fell_back);
//! ```

use std::fs;
use tempfile::TempDir;

use crate::site::{BuildSummary, PageReport};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp project directory with the given `docs.toml` and an empty
/// `content/` root.
///
/// Tests get an isolated project they can mutate without affecting other
/// tests.
pub fn project(docs_toml: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("docs.toml"), docs_toml).unwrap();
    fs::create_dir_all(tmp.path().join("content")).unwrap();
    tmp
}

/// Write a document under the project's `content/` root, creating parent
/// directories as needed.
pub fn write_doc(tmp: &TempDir, rel: &str, body: &str) {
    let path = tmp.path().join("content").join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

// =========================================================================
// Build summary lookups — panics with a clear message on miss
// =========================================================================

/// Find a page report by document id. Panics if not found.
pub fn find_report<'a>(summary: &'a BuildSummary, id: &str) -> &'a PageReport {
    summary
        .pages
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = summary.pages.iter().map(|p| p.id.as_str()).collect();
            panic!("page '{id}' not found in build. Available: {ids:?}")
        })
}
