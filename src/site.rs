//! Static site build.
//!
//! Pulls the whole pipeline together: load config, resolve every document
//! id, render each page (strict compile with lenient fallback), and write
//! the output tree.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html             # The configured default doc
//! ├── introduction.html
//! ├── guides/
//! │   └── install.html
//! └── search-index.json      # id, title, description, plain text per page
//! ```
//!
//! CSS is inlined into every page: the color variables generated from
//! `docs.toml`, the callout palette, and the static base stylesheet.

use crate::compile;
use crate::config::{self, SiteConfig};
use crate::emit;
use crate::loader::{LoadError, Loader, Origin};
use crate::nav;
use crate::render::{Block, Document, plain_text};
use crate::theme;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown theme: {0:?} (expected \"light\" or \"dark\")")]
    UnknownTheme(String),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Per-page build record.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub id: String,
    pub title: String,
    pub origin: Origin,
    /// Whether the strict compile failed and the lenient path was used.
    pub fell_back: bool,
    /// Output path relative to the output directory.
    pub output: String,
}

/// Result of a full site build.
#[derive(Debug)]
pub struct BuildSummary {
    pub pages: Vec<PageReport>,
    pub output_dir: PathBuf,
}

/// One entry of `search-index.json`.
#[derive(Debug, Serialize)]
struct SearchEntry {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    body: String,
}

/// Build the site from a project directory (the one holding `docs.toml`)
/// into `output_dir`.
pub fn build(project_dir: &Path, output_dir: &Path) -> Result<BuildSummary, BuildError> {
    let mut config = config::load_config(project_dir)?;
    let loader = make_loader(project_dir, &config);

    // No configured nav: flat tree over everything the loader can see.
    if config.nav.is_empty() {
        config.nav = nav::flat_nav(&loader.all_ids()?);
    }

    let css = site_css(&config);
    fs::create_dir_all(output_dir)?;

    let ids = build_id_list(&config, &loader)?;

    let mut pages = Vec::new();
    let mut search = Vec::new();
    for id in &ids {
        let doc = loader.load(id)?;
        // Pages are emitted theme-neutral: both themes' images stay in the
        // tree and CSS shows the matching one.
        let (page, fell_back) = compile::render_page_unfiltered(&doc.raw);
        let title = resolve_title(&page, &doc.raw, id);

        let html = emit::render_page(&config, id, &title, &page, &css).into_string();
        let output = emit::doc_href(id);
        let out_path = output_dir.join(&output);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, &html)?;

        if *id == config.default_doc {
            fs::write(output_dir.join("index.html"), &html)?;
        }

        search.push(SearchEntry {
            id: id.clone(),
            title: title.clone(),
            description: page.frontmatter.as_ref().and_then(|f| f.description.clone()),
            body: document_text(&page.document),
        });
        pages.push(PageReport {
            id: id.clone(),
            title,
            origin: doc.origin,
            fell_back,
            output,
        });
    }

    let index_json = serde_json::to_string_pretty(&search)?;
    fs::write(output_dir.join("search-index.json"), index_json)?;

    Ok(BuildSummary {
        pages,
        output_dir: output_dir.to_path_buf(),
    })
}

/// Check every page without writing output. Returns one report per page
/// that failed the strict compile, with its diagnostic.
pub fn check(project_dir: &Path) -> Result<Vec<(String, String)>, BuildError> {
    let config = config::load_config(project_dir)?;
    let loader = make_loader(project_dir, &config);

    let mut failures = Vec::new();
    for id in build_id_list(&config, &loader)? {
        let doc = loader.load(&id)?;
        if let Err(err) = compile::compile(&doc.raw, config.default_theme) {
            failures.push((id, err.to_string()));
        }
    }
    Ok(failures)
}

/// Render a single document id to a full HTML page, for the `render`
/// command. `theme` overrides the configured default when given.
pub fn render_doc(
    project_dir: &Path,
    id: &str,
    theme: Option<&str>,
) -> Result<String, BuildError> {
    let mut config = config::load_config(project_dir)?;
    if let Some(name) = theme {
        config.default_theme = crate::theme::ThemeMode::from_name(name)
            .ok_or_else(|| BuildError::UnknownTheme(name.to_string()))?;
    }
    let loader = make_loader(project_dir, &config);
    if config.nav.is_empty() {
        config.nav = nav::flat_nav(&loader.all_ids()?);
    }

    let doc = loader.load(id)?;
    let (page, _) = compile::render_page(&doc.raw, config.default_theme);
    let title = resolve_title(&page, &doc.raw, &doc.id);
    let css = site_css(&config);
    Ok(emit::render_page(&config, &doc.id, &title, &page, &css).into_string())
}

/// Document title: frontmatter first, then the leading `#` heading, then
/// a Title-Cased form of the id.
fn resolve_title(page: &compile::CompiledPage, raw: &str, id: &str) -> String {
    page.frontmatter
        .as_ref()
        .and_then(|f| f.title.clone())
        .or_else(|| crate::frontmatter::title_from_heading(raw))
        .unwrap_or_else(|| crate::loader::placeholder_title(id))
}

fn make_loader(project_dir: &Path, config: &SiteConfig) -> Loader {
    let roots = config
        .content_roots
        .iter()
        .map(|r| project_dir.join(r))
        .collect();
    Loader::new(roots)
}

/// Ids to build: everything in the nav tree plus everything on disk, the
/// default doc first, nav order preserved, no duplicates.
fn build_id_list(config: &SiteConfig, loader: &Loader) -> Result<Vec<String>, BuildError> {
    let mut ids: Vec<String> = Vec::new();
    let mut push = |id: String, ids: &mut Vec<String>| {
        if !ids.contains(&id) {
            ids.push(id);
        }
    };

    push(config.default_doc.clone(), &mut ids);
    for id in nav::doc_ids(&config.nav) {
        push(id.to_string(), &mut ids);
    }
    for id in loader.all_ids()? {
        push(id, &mut ids);
    }
    Ok(ids)
}

/// Full page CSS: config colors, callout palette, then the base stylesheet.
fn site_css(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}\n{}",
        config::generate_color_css(&config.colors),
        theme::generate_callout_css(),
        CSS_STATIC,
    )
}

/// Plain text of a document, for the search index.
fn document_text(doc: &Document) -> String {
    let mut out = String::new();
    collect_blocks(&doc.blocks, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { content, .. } | Block::Paragraph(content) => {
                out.push_str(&plain_text(content));
                out.push(' ');
            }
            Block::Callout { blocks, .. } => collect_blocks(blocks, out),
            Block::CodeBlock(code) => {
                out.push_str(&code.code);
                out.push(' ');
            }
            Block::List { items, .. } => {
                for item in items {
                    collect_blocks(item, out);
                }
            }
            Block::Table(table) => {
                for row in table.head.iter().chain(table.rows.iter().flatten()) {
                    out.push_str(&plain_text(row));
                    out.push(' ');
                }
            }
            Block::Tabs(panes) => {
                for pane in panes {
                    out.push_str(&pane.title);
                    out.push(' ');
                    collect_blocks(&pane.blocks, out);
                }
            }
            Block::Rule | Block::Html(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn build_writes_pages_and_index() {
        let tmp = project(r#"default_doc = "home""#);
        write_doc(&tmp, "home.md", "# Home\n\nwelcome\n");

        let out = tmp.path().join("dist");
        let summary = build(tmp.path(), &out).unwrap();

        assert!(out.join("home.html").is_file());
        assert!(out.join("index.html").is_file());
        assert!(out.join("search-index.json").is_file());
        assert!(!find_report(&summary, "home").fell_back);
    }

    #[test]
    fn nested_ids_create_subdirectories() {
        let tmp = project(r#"default_doc = "guides/install""#);
        write_doc(&tmp, "guides/install.mdx", "# Install\n");

        let out = tmp.path().join("dist");
        build(tmp.path(), &out).unwrap();
        assert!(out.join("guides/install.html").is_file());
    }

    #[test]
    fn default_doc_without_source_builds_placeholder() {
        let tmp = project(r#"default_doc = "nowhere""#);

        let out = tmp.path().join("dist");
        let summary = build(tmp.path(), &out).unwrap();

        let page = find_report(&summary, "nowhere");
        assert_eq!(page.origin, Origin::Placeholder);
        assert_eq!(page.title, "Nowhere");
        let html = fs::read_to_string(out.join("nowhere.html")).unwrap();
        assert!(html.contains("hasn't been written yet"));
    }

    #[test]
    fn first_heading_titles_the_emitted_page() {
        let tmp = project(r#"default_doc = "guides/install""#);
        write_doc(&tmp, "guides/install.md", "# Installation\n\nsteps\n");

        let out = tmp.path().join("dist");
        let summary = build(tmp.path(), &out).unwrap();

        assert_eq!(find_report(&summary, "guides/install").title, "Installation");
        let html = fs::read_to_string(out.join("guides/install.html")).unwrap();
        assert!(html.contains("<title>Installation - Documentation</title>"));
    }

    #[test]
    fn search_index_contains_page_text() {
        let tmp = project(r#"default_doc = "home""#);
        write_doc(
            &tmp,
            "home.md",
            "---\ntitle: Home\ndescription: The landing page\n---\n\n# Home\n\nsearchable words here\n",
        );

        let out = tmp.path().join("dist");
        build(tmp.path(), &out).unwrap();

        let index = fs::read_to_string(out.join("search-index.json")).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&index).unwrap();
        let home = entries
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["id"] == "home")
            .unwrap();
        assert_eq!(home["title"], "Home");
        assert_eq!(home["description"], "The landing page");
        assert!(home["body"].as_str().unwrap().contains("searchable words"));
    }

    #[test]
    fn malformed_page_still_builds_via_fallback() {
        let tmp = project(r#"default_doc = "broken""#);
        write_doc(&tmp, "broken.md", "<Callout type=\"tip\">never closed\n");

        let out = tmp.path().join("dist");
        let summary = build(tmp.path(), &out).unwrap();
        assert!(find_report(&summary, "broken").fell_back);
        assert!(out.join("broken.html").is_file());
    }

    #[test]
    fn check_reports_strict_failures_only() {
        let tmp = project(r#"default_doc = "good""#);
        write_doc(&tmp, "good.md", "# Fine\n");
        write_doc(&tmp, "bad.md", "<Warning>unclosed\n");

        let failures = check(tmp.path()).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "bad");
        assert!(failures[0].1.contains("malformed directive"));
    }

    #[test]
    fn build_keeps_both_theme_images() {
        let tmp = project(r#"default_doc = "home""#);
        write_doc(&tmp, "home.md", "![L](l.png#theme=light)\n\n![D](d.png#theme=dark)\n");

        let out = tmp.path().join("dist");
        build(tmp.path(), &out).unwrap();
        let html = fs::read_to_string(out.join("home.html")).unwrap();
        assert!(html.contains(r#"src="l.png""#));
        assert!(html.contains(r#"src="d.png""#));
        assert!(html.contains(r#"data-theme-only="dark""#));
    }

    #[test]
    fn render_doc_honors_theme_override() {
        let tmp = project(r#"default_doc = "home""#);
        write_doc(&tmp, "home.md", "![D](d.png#theme=dark)\n");

        let light = render_doc(tmp.path(), "home", None).unwrap();
        assert!(!light.contains(r#"src="d.png""#));

        let dark = render_doc(tmp.path(), "home", Some("dark")).unwrap();
        assert!(dark.contains(r#"src="d.png""#));
        assert!(dark.contains(r#"data-theme="dark""#));

        let err = render_doc(tmp.path(), "home", Some("sepia"));
        assert!(matches!(err, Err(BuildError::UnknownTheme(_))));
    }

    #[test]
    fn built_page_inlines_config_colors() {
        let tmp = project("default_doc = \"home\"\n\n[colors.light]\nbackground = \"#fafafa\"\n");
        write_doc(&tmp, "home.md", "# Home\n");

        let out = tmp.path().join("dist");
        build(tmp.path(), &out).unwrap();
        let html = fs::read_to_string(out.join("home.html")).unwrap();
        assert!(html.contains("--color-bg: #fafafa"));
        assert!(html.contains("--callout-warning-border"));
    }
}
