//! Strict compile path with lenient fallback.
//!
//! Two ways to turn raw page text into a [`Document`]:
//!
//! 1. **Compile** ([`compile`]): lower the structural directive tree
//!    directly, producing richer widgets (tab groups stay interactive
//!    [`Block::Tabs`] panes instead of degrading to headings). This path is
//!    strict: malformed directives and stray module lines are errors, not
//!    passthrough text.
//! 2. **Preprocess + render** ([`crate::preprocess`], [`crate::render`]):
//!    lenient, never fails, degrades unknown constructs to plain Markdown.
//!
//! [`render_page`] tries the compile path first and falls back to the
//! lenient one when it errors, mirroring how pages should stay readable
//! even when an author leaves a tag unclosed.

use crate::directive::{self, ImageDirective, Node};
use crate::frontmatter::{self, Frontmatter};
use crate::render::{self, Block, CodeDisplay, Document, TabPane};
use crate::theme::ThemeMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("malformed directive: {0}")]
    MalformedDirective(String),
    #[error("unprocessed module line: {0:?}")]
    ModuleLine(String),
}

/// A compiled page: parsed front matter plus the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPage {
    pub frontmatter: Option<Frontmatter>,
    pub document: Document,
}

/// Strictly compile raw page text under a theme mode. Theme-restricted
/// images that don't match `mode` are dropped.
///
/// Unlike the preprocessor this refuses malformed input: any directive the
/// structural parser could not consume cleanly is a [`CompileError`].
pub fn compile(raw: &str, mode: ThemeMode) -> Result<CompiledPage, CompileError> {
    compile_with_filter(raw, Some(mode))
}

/// Strict compile keeping images of both themes; the static HTML emitter
/// marks each and lets CSS pick one per `data-theme`.
pub fn compile_unfiltered(raw: &str) -> Result<CompiledPage, CompileError> {
    compile_with_filter(raw, None)
}

fn compile_with_filter(
    raw: &str,
    filter: Option<ThemeMode>,
) -> Result<CompiledPage, CompileError> {
    let (fm, body) = frontmatter::split(raw);
    let (nodes, diagnostics) = directive::parse_with_diagnostics(body);
    if let Some(first) = diagnostics.into_iter().next() {
        return Err(CompileError::MalformedDirective(first));
    }
    let blocks = lower_nodes(&nodes, filter)?;
    Ok(CompiledPage {
        frontmatter: fm,
        document: Document { blocks },
    })
}

/// Compile if possible, otherwise fall back to the lenient pipeline.
/// Returns the document plus whether the fallback was taken.
pub fn render_page(raw: &str, mode: ThemeMode) -> (CompiledPage, bool) {
    render_page_with_filter(raw, Some(mode))
}

/// Like [`render_page`] but keeping images of both themes.
pub fn render_page_unfiltered(raw: &str) -> (CompiledPage, bool) {
    render_page_with_filter(raw, None)
}

fn render_page_with_filter(raw: &str, filter: Option<ThemeMode>) -> (CompiledPage, bool) {
    match compile_with_filter(raw, filter) {
        Ok(page) => (page, false),
        Err(_) => {
            let (fm, body) = frontmatter::split(raw);
            let canonical = crate::preprocess::preprocess(body);
            let document = match filter {
                Some(mode) => render::render(&canonical, mode),
                None => render::render_unfiltered(&canonical),
            };
            let page = CompiledPage {
                frontmatter: fm,
                document,
            };
            (page, true)
        }
    }
}

fn lower_nodes(nodes: &[Node], filter: Option<ThemeMode>) -> Result<Vec<Block>, CompileError> {
    let mut blocks = Vec::new();
    for node in nodes {
        match node {
            Node::Text(text) => lower_text(text, filter, &mut blocks)?,
            Node::CodeFence { info, body, .. } => {
                // The captured body keeps the newline before the closing
                // fence; displayed code does not include it.
                let code = body.strip_suffix('\n').unwrap_or(body).to_string();
                blocks.push(Block::CodeBlock(CodeDisplay::from_fence(info, code)));
            }
            Node::Callout { kind, children } => {
                blocks.push(Block::Callout {
                    kind: *kind,
                    blocks: lower_nodes(children, filter)?,
                });
            }
            Node::TabGroup { tabs } => {
                let mut panes = Vec::with_capacity(tabs.len());
                for tab in tabs {
                    panes.push(TabPane {
                        title: tab.title.clone(),
                        blocks: lower_nodes(&tab.children, filter)?,
                    });
                }
                blocks.push(Block::Tabs(panes));
            }
            Node::Image(image) => {
                if let Some(block) = lower_image(image, filter) {
                    blocks.push(block);
                }
            }
        }
    }
    Ok(blocks)
}

/// Markdown between directives goes through the renderer, but module lines
/// that the lenient path silently strips are an error here.
fn lower_text(
    text: &str,
    filter: Option<ThemeMode>,
    blocks: &mut Vec<Block>,
) -> Result<(), CompileError> {
    for line in text.lines() {
        if crate::preprocess::is_module_line(line) {
            return Err(CompileError::ModuleLine(line.trim_end().to_string()));
        }
    }
    if text.trim().is_empty() {
        return Ok(());
    }
    let mut rendered = match filter {
        Some(mode) => render::render(text, mode),
        None => render::render_unfiltered(text),
    };
    blocks.append(&mut rendered.blocks);
    Ok(())
}

fn lower_image(image: &ImageDirective, filter: Option<ThemeMode>) -> Option<Block> {
    if let (Some(mode), Some(restriction)) = (filter, image.theme) {
        if restriction != mode {
            return None;
        }
    }
    // Reuse the inline image representation wrapped in a paragraph, same
    // shape the Markdown path produces.
    let inline = render::Inline::Image(image.clone());
    let content = match &image.link {
        Some(href) => render::Inline::Link {
            url: href.clone(),
            external: href.starts_with("http://") || href.starts_with("https://"),
            content: vec![inline],
        },
        None => inline,
    };
    Some(Block::Paragraph(vec![content]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::CalloutKind;
    use crate::render::Inline;

    // =========================================================================
    // Strict compile
    // =========================================================================

    #[test]
    fn tabs_stay_interactive_on_compile_path() {
        let raw = "<TabGroup>\n<Tab title=\"npm\">\n`npm i`\n</Tab>\n<Tab>\nother\n</Tab>\n</TabGroup>\n";
        let page = compile(raw, ThemeMode::Light).unwrap();
        let Block::Tabs(panes) = &page.document.blocks[0] else {
            panic!("expected tabs, got {:?}", page.document.blocks);
        };
        assert_eq!(panes[0].title, "npm");
        assert_eq!(panes[1].title, "Untitled");
        assert!(matches!(panes[0].blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn callout_compiles_with_nested_markdown() {
        let raw = "<Warning>\n**bold** warning\n</Warning>\n";
        let page = compile(raw, ThemeMode::Light).unwrap();
        let Block::Callout { kind, blocks } = &page.document.blocks[0] else {
            panic!("expected callout");
        };
        assert_eq!(*kind, CalloutKind::Warning);
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(&inlines[0], Inline::Strong(_)));
    }

    #[test]
    fn frontmatter_split_off_before_compile() {
        let raw = "---\ntitle: Guide\n---\n\n# Heading\n";
        let page = compile(raw, ThemeMode::Light).unwrap();
        assert_eq!(
            page.frontmatter.as_ref().and_then(|f| f.title.as_deref()),
            Some("Guide")
        );
        assert!(matches!(&page.document.blocks[0], Block::Heading { .. }));
    }

    #[test]
    fn theme_restricted_image_filtered_on_compile_path() {
        let raw = "<img src=\"d.png\" alt=\"D\" theme=\"dark\" />\n";
        let light = compile(raw, ThemeMode::Light).unwrap();
        assert!(light.document.blocks.is_empty());
        let dark = compile(raw, ThemeMode::Dark).unwrap();
        assert_eq!(dark.document.blocks.len(), 1);
    }

    #[test]
    fn unfiltered_compile_keeps_both_theme_images() {
        let raw = "<img src=\"l.png\" alt=\"L\" theme=\"light\" />\n\n<img src=\"d.png\" alt=\"D\" theme=\"dark\" />\n";
        let page = compile_unfiltered(raw).unwrap();
        assert_eq!(page.document.blocks.len(), 2);
    }

    #[test]
    fn linked_image_wraps_in_link() {
        let raw = "<a href=\"https://example.com\"><img src=\"x.png\" alt=\"X\" /></a>\n";
        let page = compile(raw, ThemeMode::Light).unwrap();
        let Block::Paragraph(inlines) = &page.document.blocks[0] else {
            panic!("expected paragraph");
        };
        let Inline::Link { url, external, content } = &inlines[0] else {
            panic!("expected link");
        };
        assert_eq!(url, "https://example.com");
        assert!(external);
        assert!(matches!(&content[0], Inline::Image(_)));
    }

    // =========================================================================
    // Strictness
    // =========================================================================

    #[test]
    fn malformed_directive_is_an_error() {
        let err = compile("<Callout type=\"tip\">never closed", ThemeMode::Light);
        assert!(matches!(err, Err(CompileError::MalformedDirective(_))));
    }

    #[test]
    fn module_line_is_an_error() {
        let err = compile(
            "import { Chart } from './chart'\n\ntext\n",
            ThemeMode::Light,
        );
        assert!(matches!(err, Err(CompileError::ModuleLine(_))));
    }

    #[test]
    fn module_line_inside_fence_is_fine() {
        let raw = "```js\nimport x from 'y'\n```\n";
        let page = compile(raw, ThemeMode::Light).unwrap();
        let Block::CodeBlock(code) = &page.document.blocks[0] else {
            panic!("expected code block");
        };
        assert_eq!(code.code, "import x from 'y'");
    }

    // =========================================================================
    // Fallback
    // =========================================================================

    #[test]
    fn render_page_falls_back_on_malformed_input() {
        let raw = "<Callout type=\"tip\">never closed\n\nmore text\n";
        let (page, fell_back) = render_page(raw, ThemeMode::Light);
        assert!(fell_back);
        // The lenient path kept the malformed tag as visible text.
        assert!(!page.document.blocks.is_empty());
    }

    #[test]
    fn render_page_prefers_compile_path() {
        let raw = "<TabGroup><Tab title=\"A\">x</Tab></TabGroup>\n";
        let (page, fell_back) = render_page(raw, ThemeMode::Light);
        assert!(!fell_back);
        assert!(matches!(&page.document.blocks[0], Block::Tabs(_)));
    }

    #[test]
    fn fallback_degrades_tabs_to_headings() {
        // Force the fallback with a module line, then check tabs degraded.
        let raw = "export const x = 1\n\n<TabGroup><Tab title=\"A\">x</Tab></TabGroup>\n";
        let (page, fell_back) = render_page(raw, ThemeMode::Light);
        assert!(fell_back);
        assert!(page.document.blocks.iter().any(|b| matches!(
            b,
            Block::Heading { level: 3, .. }
        )));
    }
}
