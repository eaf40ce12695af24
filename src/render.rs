//! Canonical Markdown → typed document tree.
//!
//! Parses GFM (tables, strikethrough, task lists) with pulldown-cmark and
//! folds the event stream into a [`Document`] of typed blocks, the structure
//! the HTML emitter walks. The interesting mappings:
//!
//! - **Blockquotes become callouts.** The first bold run of a blockquote is
//!   checked case-insensitively against the seven callout type names
//!   (`**Warning:** ...` or `**WARNING**: ...`); the marker is consumed and
//!   the matching type selected. No marker means type `note`.
//! - **Headings get slug ids** (lowercase, whitespace to hyphens, everything
//!   but word characters and hyphens stripped) for self-link anchors.
//! - **Images decode hash-fragment directives** produced by the
//!   preprocessor. An image restricted to the other theme mode is absent
//!   from the tree entirely, not rendered as a placeholder.
//! - **Code fences carry `lang[:filename]`** plus a `numbered` flag from the
//!   fence info string.
//!
//! [`LivePage`] ties a rendered tree to a [`ThemeSignal`]: the tree is
//! re-rendered inside the signal's notification callback, so it reflects a
//! mode change within one pass, without polling.

use crate::directive::{CalloutKind, ImageDirective};
use crate::theme::{Subscription, ThemeMode, ThemeSignal};
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::cell::{Ref, RefCell};
use std::iter::Peekable;
use std::rc::Rc;

/// A fully rendered document tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        /// Slug id for the self-link anchor.
        id: String,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    Callout {
        kind: CalloutKind,
        blocks: Vec<Block>,
    },
    CodeBlock(CodeDisplay),
    List {
        /// Start number for ordered lists; `None` for bullet lists.
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    Table(Table),
    Rule,
    Html(String),
    /// Interactive tab panes. Only the compile path produces these; the
    /// canonical-Markdown path degrades tabs to headings before parsing.
    Tabs(Vec<TabPane>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabPane {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// A code block ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeDisplay {
    pub language: String,
    pub filename: Option<String>,
    pub numbered: bool,
    pub code: String,
}

impl CodeDisplay {
    /// Parse a fence info string like `rust:main.rs numbered`.
    pub fn from_fence(info: &str, code: String) -> CodeDisplay {
        let mut parts = info.split_whitespace();
        let first = parts.next().unwrap_or("");
        let (language, filename) = match first.split_once(':') {
            Some((lang, file)) if !file.is_empty() => (lang, Some(file.to_string())),
            _ => (first, None),
        };
        let numbered = parts.any(|p| p == "numbered" || p == "showLineNumbers");
        CodeDisplay {
            language: if language.is_empty() {
                "plaintext".to_string()
            } else {
                language.to_string()
            },
            filename,
            numbered,
            code,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub alignments: Vec<ColumnAlign>,
    pub head: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlign {
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for ColumnAlign {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::None => ColumnAlign::None,
            Alignment::Left => ColumnAlign::Left,
            Alignment::Center => ColumnAlign::Center,
            Alignment::Right => ColumnAlign::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        url: String,
        /// External links open in a new browsing context.
        external: bool,
        content: Vec<Inline>,
    },
    Image(ImageDirective),
    SoftBreak,
    HardBreak,
    TaskMarker(bool),
    Html(String),
}

/// Render canonical Markdown under a theme mode. Theme-restricted images
/// that don't match `mode` are dropped from the tree.
pub fn render(canonical: &str, mode: ThemeMode) -> Document {
    render_with_filter(canonical, Some(mode))
}

/// Render without dropping theme-restricted images; the static HTML emitter
/// keeps both variants and lets CSS pick one per `data-theme`.
pub fn render_unfiltered(canonical: &str) -> Document {
    render_with_filter(canonical, None)
}

fn render_with_filter(canonical: &str, filter: Option<ThemeMode>) -> Document {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut events = Parser::new_ext(canonical, options).peekable();
    Document {
        blocks: parse_blocks(&mut events, filter),
    }
}

type Events<'a> = Peekable<Parser<'a>>;

fn parse_blocks(events: &mut Events<'_>, filter: Option<ThemeMode>) -> Vec<Block> {
    let mut blocks = Vec::new();
    loop {
        match events.peek() {
            None | Some(Event::End(_)) => break,
            Some(Event::Rule) => {
                events.next();
                blocks.push(Block::Rule);
            }
            Some(Event::Start(tag)) if is_block_tag(tag) => {
                let Some(Event::Start(tag)) = events.next() else {
                    unreachable!()
                };
                handle_block(tag, events, filter, &mut blocks);
            }
            Some(Event::Html(_)) => {
                let mut html = String::new();
                while let Some(Event::Html(chunk)) = events.peek() {
                    html.push_str(chunk);
                    events.next();
                }
                blocks.push(Block::Html(html));
            }
            // Loose inline content (tight list items) becomes a paragraph.
            _ => {
                let inlines = parse_inlines(events, filter);
                if inlines.is_empty() {
                    // An event we can neither treat as block nor inline;
                    // drop it rather than loop forever.
                    events.next();
                } else {
                    blocks.push(Block::Paragraph(inlines));
                }
            }
        }
    }
    blocks
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    !matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn handle_block(
    tag: Tag<'_>,
    events: &mut Events<'_>,
    filter: Option<ThemeMode>,
    blocks: &mut Vec<Block>,
) {
    match tag {
        Tag::Paragraph => {
            let inlines = parse_inlines(events, filter);
            expect_end(events);
            // A paragraph holding only a filtered-out image vanishes.
            if !inlines.is_empty() {
                blocks.push(Block::Paragraph(inlines));
            }
        }
        Tag::Heading { level, .. } => {
            let content = parse_inlines(events, filter);
            expect_end(events);
            let id = slugify(&plain_text(&content));
            blocks.push(Block::Heading {
                level: level as u8,
                id,
                content,
            });
        }
        Tag::BlockQuote(_) => {
            let inner = parse_blocks(events, filter);
            expect_end(events);
            blocks.push(detect_callout(inner));
        }
        Tag::CodeBlock(kind) => {
            let info = match &kind {
                CodeBlockKind::Fenced(info) => info.to_string(),
                CodeBlockKind::Indented => String::new(),
            };
            let mut code = String::new();
            while let Some(Event::Text(text)) = events.peek() {
                code.push_str(text);
                events.next();
            }
            expect_end(events);
            // One trailing newline comes from the parser, not the content.
            if code.ends_with('\n') {
                code.pop();
            }
            blocks.push(Block::CodeBlock(CodeDisplay::from_fence(&info, code)));
        }
        Tag::List(start) => {
            let mut items = Vec::new();
            while matches!(events.peek(), Some(Event::Start(Tag::Item))) {
                events.next();
                items.push(parse_blocks(events, filter));
                expect_end(events);
            }
            expect_end(events);
            blocks.push(Block::List { start, items });
        }
        Tag::Table(alignments) => {
            let alignments = alignments.into_iter().map(ColumnAlign::from).collect();
            let mut head = Vec::new();
            let mut rows = Vec::new();
            if matches!(events.peek(), Some(Event::Start(Tag::TableHead))) {
                events.next();
                head = parse_row(events, filter);
                expect_end(events);
            }
            while matches!(events.peek(), Some(Event::Start(Tag::TableRow))) {
                events.next();
                rows.push(parse_row(events, filter));
                expect_end(events);
            }
            expect_end(events);
            blocks.push(Block::Table(Table {
                alignments,
                head,
                rows,
            }));
        }
        Tag::HtmlBlock => {
            let mut html = String::new();
            loop {
                match events.peek() {
                    Some(Event::Html(chunk)) | Some(Event::Text(chunk)) => {
                        html.push_str(chunk);
                        events.next();
                    }
                    _ => break,
                }
            }
            expect_end(events);
            blocks.push(Block::Html(html));
        }
        // Any other container (footnote definitions, definition lists):
        // parse the children and splice them in at this level.
        _ => {
            let mut inner = parse_blocks(events, filter);
            expect_end(events);
            blocks.append(&mut inner);
        }
    }
}

fn parse_row(events: &mut Events<'_>, filter: Option<ThemeMode>) -> Vec<Vec<Inline>> {
    let mut cells = Vec::new();
    while matches!(events.peek(), Some(Event::Start(Tag::TableCell))) {
        events.next();
        cells.push(parse_inlines(events, filter));
        expect_end(events);
    }
    cells
}

fn parse_inlines(events: &mut Events<'_>, filter: Option<ThemeMode>) -> Vec<Inline> {
    let mut inlines: Vec<Inline> = Vec::new();
    loop {
        match events.peek() {
            Some(Event::Text(_)) => {
                let Some(Event::Text(text)) = events.next() else {
                    unreachable!()
                };
                if let Some(Inline::Text(last)) = inlines.last_mut() {
                    last.push_str(&text);
                } else {
                    inlines.push(Inline::Text(text.to_string()));
                }
            }
            Some(Event::Code(_)) => {
                let Some(Event::Code(code)) = events.next() else {
                    unreachable!()
                };
                inlines.push(Inline::Code(code.to_string()));
            }
            Some(Event::InlineHtml(_)) => {
                let Some(Event::InlineHtml(html)) = events.next() else {
                    unreachable!()
                };
                inlines.push(Inline::Html(html.to_string()));
            }
            Some(Event::SoftBreak) => {
                events.next();
                inlines.push(Inline::SoftBreak);
            }
            Some(Event::HardBreak) => {
                events.next();
                inlines.push(Inline::HardBreak);
            }
            Some(Event::TaskListMarker(_)) => {
                let Some(Event::TaskListMarker(checked)) = events.next() else {
                    unreachable!()
                };
                inlines.push(Inline::TaskMarker(checked));
            }
            Some(Event::Start(Tag::Emphasis)) => {
                events.next();
                let inner = parse_inlines(events, filter);
                expect_end(events);
                inlines.push(Inline::Emphasis(inner));
            }
            Some(Event::Start(Tag::Strong)) => {
                events.next();
                let inner = parse_inlines(events, filter);
                expect_end(events);
                inlines.push(Inline::Strong(inner));
            }
            Some(Event::Start(Tag::Strikethrough)) => {
                events.next();
                let inner = parse_inlines(events, filter);
                expect_end(events);
                inlines.push(Inline::Strikethrough(inner));
            }
            Some(Event::Start(Tag::Link { .. })) => {
                let Some(Event::Start(Tag::Link { dest_url, .. })) = events.next() else {
                    unreachable!()
                };
                let content = parse_inlines(events, filter);
                expect_end(events);
                // A link wrapping only a filtered-out image vanishes with it.
                if content.is_empty() {
                    continue;
                }
                let url = dest_url.to_string();
                let external = is_external(&url);
                inlines.push(Inline::Link {
                    url,
                    external,
                    content,
                });
            }
            Some(Event::Start(Tag::Image { .. })) => {
                let Some(Event::Start(Tag::Image { dest_url, .. })) = events.next() else {
                    unreachable!()
                };
                let alt_inlines = parse_inlines(events, filter);
                expect_end(events);
                let directive = ImageDirective::from_url(&dest_url, &plain_text(&alt_inlines));
                match (filter, directive.theme) {
                    (Some(mode), Some(restriction)) if restriction != mode => {
                        // Absent from the tree, not a placeholder.
                    }
                    _ => inlines.push(Inline::Image(directive)),
                }
            }
            _ => break,
        }
    }
    inlines
}

fn expect_end(events: &mut Events<'_>) {
    debug_assert!(matches!(events.peek(), Some(Event::End(_)) | None));
    if matches!(events.peek(), Some(Event::End(_))) {
        events.next();
    }
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Heading slug: lowercase, whitespace runs to a single hyphen, strip
/// everything that is not a word character or hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch);
        }
    }
    slug
}

/// Flatten inline content to plain text, for slugs and image alt text.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut text = String::new();
    collect_text(inlines, &mut text);
    text
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(inner)
            | Inline::Strong(inner)
            | Inline::Strikethrough(inner)
            | Inline::Link { content: inner, .. } => collect_text(inner, out),
            Inline::Image(img) => out.push_str(&img.alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::TaskMarker(_) | Inline::Html(_) => {}
        }
    }
}

/// Turn a blockquote into a callout: consume a leading `**Type:**` /
/// `**TYPE**:` marker if present, defaulting to `note` without one.
fn detect_callout(mut blocks: Vec<Block>) -> Block {
    let mut kind = CalloutKind::Note;

    let marker_kind = match blocks.first() {
        Some(Block::Paragraph(inlines)) => match inlines.first() {
            Some(Inline::Strong(strong)) => {
                let marker = plain_text(strong);
                CalloutKind::from_name(marker.trim().trim_end_matches(':').trim())
            }
            _ => None,
        },
        _ => None,
    };

    if let Some(found) = marker_kind {
        kind = found;
        if let Some(Block::Paragraph(inlines)) = blocks.first_mut() {
            inlines.remove(0);
            if let Some(Inline::Text(text)) = inlines.first_mut() {
                let rest = text.trim_start();
                let rest = rest.strip_prefix(':').map(str::trim_start).unwrap_or(rest);
                *text = rest.to_string();
                if text.is_empty() {
                    inlines.remove(0);
                }
            }
            if inlines.is_empty() {
                blocks.remove(0);
            }
        }
    }

    Block::Callout { kind, blocks }
}

// =============================================================================
// Live page: tree kept in sync with the theme signal
// =============================================================================

/// A rendered page whose tree tracks a [`ThemeSignal`].
///
/// The signal's notification callback re-renders the canonical text under
/// the new mode, so theme-restricted images appear and disappear without
/// reloading content. Dropping the page drops its subscription.
pub struct LivePage {
    canonical: Rc<String>,
    tree: Rc<RefCell<Document>>,
    _subscription: Subscription,
}

impl LivePage {
    pub fn new(canonical: impl Into<String>, signal: &ThemeSignal) -> LivePage {
        let canonical = Rc::new(canonical.into());
        let tree = Rc::new(RefCell::new(render(&canonical, signal.get())));
        let cb_text = Rc::clone(&canonical);
        let cb_tree = Rc::clone(&tree);
        let subscription = signal.subscribe(move |mode| {
            *cb_tree.borrow_mut() = render(&cb_text, mode);
        });
        LivePage {
            canonical,
            tree,
            _subscription: subscription,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Current document tree. The borrow must not be held across a theme
    /// change (the notification callback takes a mutable borrow).
    pub fn document(&self) -> Ref<'_, Document> {
        self.tree.borrow()
    }
}
