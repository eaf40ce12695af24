//! HTML emission.
//!
//! Walks a rendered [`Document`] tree and produces the final page HTML.
//!
//! ## Generated Pages
//!
//! - **Doc pages** (`/{id}.html`): sidebar nav, breadcrumbs, metadata
//!   chips, the rendered article, and an optional "Edit this page" link
//! - **Index page** (`/index.html`): the configured default doc
//!
//! ## Theming
//!
//! Pages are emitted once, theme-neutral: color values live in CSS custom
//! properties keyed off the `data-theme` attribute, and theme-restricted
//! images are emitted for both modes with a `data-theme-only` attribute the
//! stylesheet uses to show exactly one. A small script toggles the
//! attribute and persists the choice.
//!
//! ## Widgets without JavaScript
//!
//! Tab groups use the radio-input trick (inputs + labels + CSS), so tabs
//! switch even with scripting disabled.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::compile::CompiledPage;
use crate::config::SiteConfig;
use crate::directive::ImageDirective;
use crate::nav::{self, NavNode};
use crate::render::{Block, CodeDisplay, ColumnAlign, Document, Inline, TabPane, Table};
use crate::theme::callout_style;
use crate::theme::ThemeMode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const JS: &str = include_str!("../static/theme.js");

/// Renders the base HTML document structure.
fn base_document(title: &str, css: &str, default_theme: ThemeMode, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" data-theme=(default_theme.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.css";
                style { (css) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the site header with title and theme toggle.
fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site_title) }
            button.theme-toggle type="button" aria-label="Toggle theme" {
                span.theme-icon-light { "☀" }
                span.theme-icon-dark { "☾" }
            }
        }
    }
}

/// Renders the sidebar navigation tree.
pub fn render_nav(nodes: &[NavNode], current_id: &str) -> Markup {
    html! {
        nav.sidebar {
            ul {
                @for node in nodes {
                    (render_nav_node(node, current_id))
                }
            }
        }
    }
}

fn render_nav_node(node: &NavNode, current_id: &str) -> Markup {
    html! {
        @match node {
            NavNode::Doc { id, .. } => {
                @let is_current = id == current_id;
                li class=[is_current.then_some("current")] {
                    a href={ "/" (doc_href(id)) } { (node.label()) }
                }
            }
            NavNode::Section { label, children } => {
                li.nav-section {
                    span.nav-group { (label) }
                    ul {
                        @for child in children {
                            (render_nav_node(child, current_id))
                        }
                    }
                }
            }
            NavNode::Link { label, url } => {
                li {
                    a href=(url) target="_blank" rel="noopener" { (label) }
                }
            }
        }
    }
}

/// Output filename for a doc id (`guides/install` → `guides/install.html`).
pub fn doc_href(id: &str) -> String {
    format!("{id}.html")
}

/// Renders the breadcrumb trail above the article.
fn render_breadcrumbs(site_title: &str, trail: &[String]) -> Markup {
    html! {
        nav.breadcrumbs {
            a href="/" { (site_title) }
            @for segment in trail {
                " › "
                span { (segment) }
            }
        }
    }
}

/// Renders a full doc page. `title` is the resolved document title
/// (frontmatter, first heading, or id-derived, in that order of preference).
pub fn render_page(
    config: &SiteConfig,
    doc_id: &str,
    title: &str,
    page: &CompiledPage,
    css: &str,
) -> Markup {
    let fm = page.frontmatter.as_ref();
    let page_title = format!("{title} - {}", config.title);

    let trail = nav::breadcrumb(&config.nav, doc_id).unwrap_or_else(|| vec![title.to_string()]);
    let edit_url = config.repository.as_ref().map(|r| r.edit_url(doc_id));

    let content = html! {
        (site_header(&config.title))
        div.layout {
            (render_nav(&config.nav, doc_id))
            main.doc-page {
                (render_breadcrumbs(&config.title, &trail))
                @if fm.map(|f| f.has_metadata()).unwrap_or(false) {
                    div.doc-meta {
                        @if let Some(category) = fm.and_then(|f| f.category.as_deref()) {
                            span.meta-chip.meta-category { (category) }
                        }
                        @if let Some(updated) = fm.and_then(|f| f.last_updated.as_deref()) {
                            span.meta-chip.meta-updated { "Updated " (updated) }
                        }
                    }
                }
                article.doc-content {
                    (render_document(&page.document))
                }
                @if let Some(url) = &edit_url {
                    footer.doc-footer {
                        a.edit-link href=(url) target="_blank" rel="noopener" {
                            "Edit this page"
                        }
                    }
                }
            }
        }
    };

    base_document(&page_title, css, config.default_theme, content)
}

// ============================================================================
// Document tree renderers
// ============================================================================

/// Renders a document tree to markup.
pub fn render_document(doc: &Document) -> Markup {
    let mut tab_group = 0usize;
    html! {
        @for block in &doc.blocks {
            (render_block(block, &mut tab_group))
        }
    }
}

fn render_block(block: &Block, tab_group: &mut usize) -> Markup {
    match block {
        Block::Heading { level, id, content } => {
            let inner = html! {
                a.heading-anchor href={ "#" (id) } { (render_inlines(content)) }
            };
            match level {
                1 => html! { h1 id=(id) { (inner) } },
                2 => html! { h2 id=(id) { (inner) } },
                3 => html! { h3 id=(id) { (inner) } },
                4 => html! { h4 id=(id) { (inner) } },
                5 => html! { h5 id=(id) { (inner) } },
                _ => html! { h6 id=(id) { (inner) } },
            }
        }
        Block::Paragraph(inlines) => html! {
            p { (render_inlines(inlines)) }
        },
        Block::Callout { kind, blocks } => {
            // Icon class is mode-independent; colors come from CSS variables.
            let style = callout_style(*kind, ThemeMode::Light);
            html! {
                aside.callout.{ "callout-" (kind.name()) } {
                    div.callout-title {
                        i class=(style.icon) aria-hidden="true" {}
                        span { (kind.label()) }
                    }
                    div.callout-body {
                        @for child in blocks {
                            (render_block(child, tab_group))
                        }
                    }
                }
            }
        }
        Block::CodeBlock(code) => render_code(code),
        Block::List { start, items } => {
            let rendered_items = html! {
                @for item in items {
                    li {
                        @for child in item {
                            (render_block(child, tab_group))
                        }
                    }
                }
            };
            match start {
                Some(n) => html! { ol start=(n) { (rendered_items) } },
                None => html! { ul { (rendered_items) } },
            }
        }
        Block::Table(table) => render_table(table),
        Block::Rule => html! { hr; },
        Block::Html(raw) => html! { (PreEscaped(raw.clone())) },
        Block::Tabs(panes) => {
            *tab_group += 1;
            render_tabs(panes, *tab_group, tab_group)
        }
    }
}

/// Tab groups switch via hidden radio inputs; no scripting required.
fn render_tabs(panes: &[TabPane], group: usize, tab_group: &mut usize) -> Markup {
    let name = format!("tabs-{group}");
    html! {
        div.tab-group {
            div.tab-bar role="tablist" {
                @for (idx, pane) in panes.iter().enumerate() {
                    @let id = format!("{name}-{idx}");
                    input type="radio" name=(name) id=(id) checked[idx == 0];
                    label for=(id) { (pane.title) }
                }
            }
            @for pane in panes {
                div.tab-panel role="tabpanel" {
                    @for block in &pane.blocks {
                        (render_block(block, tab_group))
                    }
                }
            }
        }
    }
}

fn render_code(code: &CodeDisplay) -> Markup {
    let lang_class = format!("language-{}", code.language);
    html! {
        figure.code-block {
            @if code.filename.is_some() || !code.language.is_empty() {
                figcaption.code-header {
                    @if let Some(filename) = &code.filename {
                        span.code-filename { (filename) }
                    }
                    span.code-lang { (code.language) }
                }
            }
            pre class=[code.numbered.then_some("numbered")] {
                code class=(lang_class) {
                    @if code.numbered {
                        @for line in code.code.lines() {
                            span.code-line { (line) } "\n"
                        }
                    } @else {
                        (code.code)
                    }
                }
            }
        }
    }
}

fn render_table(table: &Table) -> Markup {
    let align_class = |idx: usize| -> Option<&'static str> {
        match table.alignments.get(idx) {
            Some(ColumnAlign::Left) => Some("align-left"),
            Some(ColumnAlign::Center) => Some("align-center"),
            Some(ColumnAlign::Right) => Some("align-right"),
            _ => None,
        }
    };
    html! {
        div.table-wrap {
            table {
                @if !table.head.is_empty() {
                    thead {
                        tr {
                            @for (idx, cell) in table.head.iter().enumerate() {
                                th class=[align_class(idx)] { (render_inlines(cell)) }
                            }
                        }
                    }
                }
                tbody {
                    @for row in &table.rows {
                        tr {
                            @for (idx, cell) in row.iter().enumerate() {
                                td class=[align_class(idx)] { (render_inlines(cell)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_inlines(inlines: &[Inline]) -> Markup {
    html! {
        @for inline in inlines {
            (render_inline(inline))
        }
    }
}

fn render_inline(inline: &Inline) -> Markup {
    match inline {
        Inline::Text(text) => html! { (text) },
        Inline::Code(code) => html! { code { (code) } },
        Inline::Emphasis(inner) => html! { em { (render_inlines(inner)) } },
        Inline::Strong(inner) => html! { strong { (render_inlines(inner)) } },
        Inline::Strikethrough(inner) => html! { del { (render_inlines(inner)) } },
        Inline::Link {
            url,
            external,
            content,
        } => html! {
            @if *external {
                a href=(url) target="_blank" rel="noopener" { (render_inlines(content)) }
            } @else {
                a href=(url) { (render_inlines(content)) }
            }
        },
        Inline::Image(image) => render_image(image),
        Inline::SoftBreak => html! { " " },
        Inline::HardBreak => html! { br; },
        Inline::TaskMarker(checked) => html! {
            input type="checkbox" disabled checked[*checked];
        },
        Inline::Html(raw) => html! { (PreEscaped(raw.clone())) },
    }
}

fn render_image(image: &ImageDirective) -> Markup {
    let class = if image.no_zoom {
        "doc-image no-zoom"
    } else {
        "doc-image"
    };
    let img = html! {
        img class=(class)
            src=(image.src)
            alt=(image.alt)
            width=[image.width]
            height=[image.height]
            data-theme-only=[image.theme.map(|t| t.as_str())]
            loading="lazy";
    };
    match &image.link {
        Some(href) => html! { a href=(href) { (img) } },
        None => img,
    }
}
