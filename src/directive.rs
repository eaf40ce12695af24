//! Structural parsing of MDX custom tags.
//!
//! Raw content embeds a small family of component-like tags on top of plain
//! Markdown: callouts, tab groups, and attributed images. Earlier revisions of
//! this pipeline rewrote them with an ordered chain of regex substitutions,
//! which breaks down under nesting (a callout containing a tab group) and
//! needs a protect/restore hack to keep fenced code untouched. This module
//! parses the tags into a small interim tree instead:
//!
//! ```text
//! <Callout type="warning">        Node::Callout
//!   <TabGroup>                      └─ Node::TabGroup
//!     <Tab title="A">x</Tab>             └─ TabItem { title, children }
//!   </TabGroup>
//! </Callout>
//! ```
//!
//! Fenced code blocks are captured verbatim as [`Node::CodeFence`] before any
//! tag matching happens, so code content is never rewritten — even if it
//! contains text that looks like a callout or image tag.
//!
//! ## Malformed input
//!
//! A tag that doesn't parse (unclosed, missing required attribute) is kept as
//! literal text and recorded as a diagnostic. The lenient entry point
//! ([`parse`]) discards diagnostics — literal passthrough renders as visible
//! raw markup rather than failing the page. The compile path uses
//! [`parse_with_diagnostics`] and treats any diagnostic as a hard error.

use crate::theme::ThemeMode;

/// A parsed fragment of raw MDX content.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain text (Markdown, no custom tags).
    Text(String),
    /// A fenced code block, content byte-identical to the source.
    CodeFence {
        /// Backtick run that opened the fence (usually <code>```</code>).
        fence: String,
        /// Info string after the opening fence (e.g. `rust:main.rs numbered`).
        info: String,
        /// Everything between the fences, including the final newline.
        body: String,
    },
    /// A callout block with exactly one type.
    Callout { kind: CalloutKind, children: Vec<Node> },
    /// An ordered, non-empty group of titled tabs.
    TabGroup { tabs: Vec<TabItem> },
    /// An image tag with optional sizing/zoom/theme attributes.
    Image(ImageDirective),
}

/// One tab inside a [`Node::TabGroup`].
#[derive(Debug, Clone, PartialEq)]
pub struct TabItem {
    pub title: String,
    pub children: Vec<Node>,
}

/// The fixed callout type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalloutKind {
    Note,
    Info,
    Tip,
    Warning,
    Caution,
    Error,
    Success,
}

impl CalloutKind {
    pub const ALL: [CalloutKind; 7] = [
        CalloutKind::Note,
        CalloutKind::Info,
        CalloutKind::Tip,
        CalloutKind::Warning,
        CalloutKind::Caution,
        CalloutKind::Error,
        CalloutKind::Success,
    ];

    /// Case-insensitive lookup; `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<CalloutKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Lowercase name as used in `type="..."` attributes and CSS classes.
    pub fn name(self) -> &'static str {
        match self {
            CalloutKind::Note => "note",
            CalloutKind::Info => "info",
            CalloutKind::Tip => "tip",
            CalloutKind::Warning => "warning",
            CalloutKind::Caution => "caution",
            CalloutKind::Error => "error",
            CalloutKind::Success => "success",
        }
    }

    /// Display label used in the canonical blockquote marker (`**Warning:**`).
    pub fn label(self) -> &'static str {
        match self {
            CalloutKind::Note => "Note",
            CalloutKind::Info => "Info",
            CalloutKind::Tip => "Tip",
            CalloutKind::Warning => "Warning",
            CalloutKind::Caution => "Caution",
            CalloutKind::Error => "Error",
            CalloutKind::Success => "Success",
        }
    }
}

/// An image reference plus display attributes.
///
/// Attributes survive the canonical-Markdown round trip as hash-fragment
/// parameters on the URL (`photo.png#w=300&theme=dark`); [`encoded_src`] and
/// [`from_url`] are exact inverses for every representable directive.
///
/// [`encoded_src`]: ImageDirective::encoded_src
/// [`from_url`]: ImageDirective::from_url
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageDirective {
    /// Fetch URL, free of encoded parameters.
    pub src: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Suppress the click-to-zoom overlay.
    pub no_zoom: bool,
    /// Render only under this theme mode; `None` renders unconditionally.
    pub theme: Option<ThemeMode>,
    /// Wrapping anchor target, for images inside `<a>` tags.
    pub link: Option<String>,
}

impl ImageDirective {
    /// URL with attributes re-encoded as hash-fragment parameters.
    pub fn encoded_src(&self) -> String {
        let mut params = Vec::new();
        if let Some(w) = self.width {
            params.push(format!("w={w}"));
        }
        if let Some(h) = self.height {
            params.push(format!("h={h}"));
        }
        if self.no_zoom {
            params.push("nozoom".to_string());
        }
        if let Some(mode) = self.theme {
            params.push(format!("theme={mode}"));
        }
        if params.is_empty() {
            self.src.clone()
        } else {
            format!("{}#{}", self.src, params.join("&"))
        }
    }

    /// Decode hash-fragment parameters from a URL produced by
    /// [`encoded_src`](ImageDirective::encoded_src).
    ///
    /// Fragments that contain none of the recognized keys are left on the URL
    /// untouched (they may be ordinary anchors).
    pub fn from_url(url: &str, alt: &str) -> ImageDirective {
        let mut directive = ImageDirective {
            src: url.to_string(),
            alt: alt.to_string(),
            ..ImageDirective::default()
        };

        let Some((base, fragment)) = url.split_once('#') else {
            return directive;
        };

        let mut recognized = false;
        let mut decoded = ImageDirective {
            src: base.to_string(),
            alt: alt.to_string(),
            ..ImageDirective::default()
        };
        for param in fragment.split('&') {
            let (key, value) = match param.split_once('=') {
                Some((k, v)) => (k, v),
                None => (param, ""),
            };
            match key {
                "w" | "width" => {
                    decoded.width = value.parse().ok();
                    recognized = true;
                }
                "h" | "height" => {
                    decoded.height = value.parse().ok();
                    recognized = true;
                }
                "nozoom" => {
                    decoded.no_zoom = true;
                    recognized = true;
                }
                "theme" => {
                    decoded.theme = ThemeMode::from_name(value);
                    recognized = true;
                }
                _ => {}
            }
        }

        if recognized { decoded } else { directive }
    }
}

/// Parse raw content leniently: malformed tags stay as literal text.
pub fn parse(input: &str) -> Vec<Node> {
    parse_with_diagnostics(input).0
}

/// Parse raw content, collecting a diagnostic for every construct that was
/// recognized as a directive but failed to parse (unclosed tag, missing
/// `src`, empty tab group). The nodes are the same lenient result as
/// [`parse`]; callers decide whether diagnostics are fatal.
pub fn parse_with_diagnostics(input: &str) -> (Vec<Node>, Vec<String>) {
    let mut diagnostics = Vec::new();
    let nodes = Scanner::new(input).run(&mut diagnostics);
    (nodes, diagnostics)
}

const CALLOUT_TAGS: [&str; 7] = ["Note", "Info", "Tip", "Warning", "Caution", "Error", "Success"];

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.input.as_bytes()[self.pos - 1] == b'\n'
    }

    fn run(&mut self, diagnostics: &mut Vec<String>) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while self.pos < self.input.len() {
            if self.at_line_start() && self.rest().starts_with("```") {
                flush_text(&mut text, &mut nodes);
                nodes.push(self.consume_fence());
                continue;
            }
            if self.rest().starts_with('<') {
                if let Some(node) = self.try_directive(diagnostics) {
                    flush_text(&mut text, &mut nodes);
                    nodes.push(node);
                    continue;
                }
            }
            // Advance one char into the text accumulator.
            let Some(ch) = self.rest().chars().next() else {
                break;
            };
            text.push(ch);
            self.pos += ch.len_utf8();
        }

        flush_text(&mut text, &mut nodes);
        nodes
    }

    /// Consume a fenced code block starting at the current position.
    fn consume_fence(&mut self) -> Node {
        let rest = self.rest();
        let ticks = rest.chars().take_while(|&c| c == '`').count();
        let fence: String = "`".repeat(ticks);

        let after_fence = &rest[ticks..];
        let (info_line, line_len) = match after_fence.find('\n') {
            Some(nl) => (&after_fence[..nl], ticks + nl + 1),
            None => (after_fence, rest.len()),
        };
        let info = info_line.trim().to_string();
        self.pos += line_len;

        // Scan line by line for a closing fence of at least equal length.
        let body_start = self.pos;
        let mut body_end = self.input.len();
        let mut close_end = self.input.len();
        let mut line_start = self.pos;
        while line_start < self.input.len() {
            let line_end = self.input[line_start..]
                .find('\n')
                .map(|nl| line_start + nl + 1)
                .unwrap_or(self.input.len());
            let line = self.input[line_start..line_end].trim_end();
            if is_closing_fence(line, ticks) {
                body_end = line_start;
                close_end = line_end;
                break;
            }
            line_start = line_end;
        }

        let body = self.input[body_start..body_end].to_string();
        self.pos = close_end;
        Node::CodeFence { fence, info, body }
    }

    /// Attempt to parse a directive tag at the current position. Returns
    /// `None` (without consuming) when the text is not a well-formed
    /// directive; the caller then treats `<` as ordinary text.
    fn try_directive(&mut self, diagnostics: &mut Vec<String>) -> Option<Node> {
        let rest = self.rest();
        let name_end = rest[1..]
            .find(|c: char| !c.is_ascii_alphanumeric())
            .map(|i| i + 1)?;
        let name = &rest[1..name_end];

        match name {
            "Callout" => self.parse_callout_tag(diagnostics),
            "TabGroup" => self.parse_tab_group(diagnostics),
            "img" => self.parse_img(diagnostics, None),
            "a" => self.parse_linked_img(diagnostics),
            _ if CALLOUT_TAGS.contains(&name) => self.parse_named_callout(name, diagnostics),
            _ => None,
        }
    }

    /// `<Callout type="warning">body</Callout>`
    fn parse_callout_tag(&mut self, diagnostics: &mut Vec<String>) -> Option<Node> {
        let (attrs, open_len) = parse_open_tag(self.rest(), "Callout")?;
        let kind = attrs
            .iter()
            .find(|(k, _)| k == "type")
            .and_then(|(_, v)| v.as_deref())
            .and_then(CalloutKind::from_name)
            // Unrecognized or missing type markers default to note.
            .unwrap_or(CalloutKind::Note);

        self.parse_paired_body(open_len, "Callout", diagnostics)
            .map(|children| Node::Callout { kind, children })
    }

    /// Per-type sugar: `<Warning>body</Warning>` and friends.
    fn parse_named_callout(&mut self, name: &str, diagnostics: &mut Vec<String>) -> Option<Node> {
        let (_, open_len) = parse_open_tag(self.rest(), name)?;
        let kind = CalloutKind::from_name(name).unwrap_or(CalloutKind::Note);
        self.parse_paired_body(open_len, name, diagnostics)
            .map(|children| Node::Callout { kind, children })
    }

    /// Consume `<Tag ...>inner</Tag>`, parsing the inner region recursively.
    /// The open tag is described by `open_len` bytes at the current position.
    fn parse_paired_body(
        &mut self,
        open_len: usize,
        name: &str,
        diagnostics: &mut Vec<String>,
    ) -> Option<Vec<Node>> {
        let after_open = &self.rest()[open_len..];
        let Some((inner_end, close_end)) = find_matching_close(after_open, name) else {
            diagnostics.push(format!("unclosed <{name}> tag"));
            return None;
        };
        let inner = &after_open[..inner_end];
        let children = Scanner::new(inner.trim()).run(diagnostics);
        self.pos += open_len + close_end;
        Some(children)
    }

    /// `<TabGroup>` containing one or more `<Tab title="...">` children.
    fn parse_tab_group(&mut self, diagnostics: &mut Vec<String>) -> Option<Node> {
        let (_, open_len) = parse_open_tag(self.rest(), "TabGroup")?;
        let after_open = &self.rest()[open_len..];
        let Some((inner_end, close_end)) = find_matching_close(after_open, "TabGroup") else {
            diagnostics.push("unclosed <TabGroup> tag".to_string());
            return None;
        };
        let inner = &after_open[..inner_end];

        let mut tabs = Vec::new();
        let mut cursor = 0;
        while let Some(open_rel) = find_tag_open(&inner[cursor..], "Tab") {
            let tab_start = cursor + open_rel;
            let Some((attrs, tab_open_len)) = parse_open_tag(&inner[tab_start..], "Tab") else {
                break;
            };
            let body_start = tab_start + tab_open_len;
            let Some((body_end, tab_close_end)) =
                find_matching_close(&inner[body_start..], "Tab")
            else {
                diagnostics.push("unclosed <Tab> tag".to_string());
                break;
            };
            let title = attrs
                .iter()
                .find(|(k, _)| k == "title")
                .and_then(|(_, v)| v.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let body = inner[body_start..body_start + body_end].trim();
            tabs.push(TabItem {
                title,
                children: Scanner::new(body).run(diagnostics),
            });
            cursor = body_start + tab_close_end;
        }

        if tabs.is_empty() {
            diagnostics.push("<TabGroup> with no <Tab> children".to_string());
            return None;
        }

        self.pos += open_len + close_end;
        Some(Node::TabGroup { tabs })
    }

    /// `<img src="..." width="300" data-theme="dark" />`
    fn parse_img(&mut self, diagnostics: &mut Vec<String>, link: Option<String>) -> Option<Node> {
        let (attrs, len) = parse_void_tag(self.rest(), "img")?;
        let directive = img_directive_from_attrs(&attrs, link)?;
        if directive.src.is_empty() {
            diagnostics.push("<img> tag without src attribute".to_string());
            return None;
        }
        self.pos += len;
        Some(Node::Image(directive))
    }

    /// `<a href="..."><img ... /></a>` — an image wrapped in a link.
    fn parse_linked_img(&mut self, diagnostics: &mut Vec<String>) -> Option<Node> {
        let (attrs, a_len) = parse_open_tag(self.rest(), "a")?;
        let href = attrs
            .iter()
            .find(|(k, _)| k == "href")
            .and_then(|(_, v)| v.clone())?;

        let after_a = &self.rest()[a_len..];
        let ws = after_a.len() - after_a.trim_start().len();
        let (img_attrs, img_len) = parse_void_tag(&after_a[ws..], "img")?;

        let after_img = &after_a[ws + img_len..];
        let ws2 = after_img.len() - after_img.trim_start().len();
        if !after_img[ws2..].starts_with("</a>") {
            return None;
        }

        let directive = img_directive_from_attrs(&img_attrs, Some(href))?;
        if directive.src.is_empty() {
            diagnostics.push("<img> tag without src attribute".to_string());
            return None;
        }
        self.pos += a_len + ws + img_len + ws2 + "</a>".len();
        Some(Node::Image(directive))
    }
}

fn flush_text(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

fn is_closing_fence(line: &str, ticks: usize) -> bool {
    let run = line.chars().take_while(|&c| c == '`').count();
    run >= ticks && line[run..].trim().is_empty()
}

fn img_directive_from_attrs(
    attrs: &[(String, Option<String>)],
    link: Option<String>,
) -> Option<ImageDirective> {
    let mut directive = ImageDirective {
        link,
        ..ImageDirective::default()
    };
    for (key, value) in attrs {
        let value = value.as_deref().unwrap_or("");
        match key.as_str() {
            "src" => directive.src = value.to_string(),
            "alt" => directive.alt = value.to_string(),
            "width" => directive.width = parse_dimension(value),
            "height" => directive.height = parse_dimension(value),
            "nozoom" | "data-nozoom" => directive.no_zoom = value != "false",
            "theme" | "data-theme" => directive.theme = ThemeMode::from_name(value),
            _ => {}
        }
    }
    Some(directive)
}

/// Parse `"300"` or `"300px"` into a pixel count.
fn parse_dimension(value: &str) -> Option<u32> {
    value.trim_end_matches("px").trim().parse().ok()
}

/// Parse an opening tag `<Name attr="v" ...>` at the start of `s`.
/// Returns the attributes and the byte length of the tag. A self-closing
/// form (`/>`) is accepted and treated as an open tag with an empty body
/// immediately closed by the caller's matcher — callers that need true
/// pairing should check for content.
fn parse_open_tag(s: &str, name: &str) -> Option<(Vec<(String, Option<String>)>, usize)> {
    let prefix_len = 1 + name.len();
    if !s.starts_with('<') || !s[1..].starts_with(name) {
        return None;
    }
    // Require a boundary so `<Tab` doesn't match `<TabGroup`.
    let boundary = s[prefix_len..].chars().next()?;
    if boundary.is_ascii_alphanumeric() {
        return None;
    }
    let close = find_tag_close(s)?;
    let attr_str = s[prefix_len..close].trim_end_matches('/');
    Some((parse_attrs(attr_str), close + 1))
}

/// Byte offset of the `>` that closes the tag starting at `s[0]`, skipping
/// quoted attribute values. Tags don't span blank lines, and a stray `<`
/// before the close means this wasn't a tag.
fn find_tag_close(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i == bytes.len() {
                    return None;
                }
            }
            b'>' => return Some(i),
            b'<' => return None,
            b'\n' if bytes.get(i + 1) == Some(&b'\n') => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Parse a void tag `<img ...>` or `<img ... />` at the start of `s`.
fn parse_void_tag(s: &str, name: &str) -> Option<(Vec<(String, Option<String>)>, usize)> {
    parse_open_tag(s, name)
}

/// Split an attribute string into `(name, value)` pairs. Values may be
/// double-quoted, single-quoted, or bare; attributes without `=` are flags.
fn parse_attrs(s: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        if i == name_start {
            break;
        }
        let name = s[name_start..i].to_string();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                let value = s[value_start..i].to_string();
                i = (i + 1).min(bytes.len());
                value
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                s[value_start..i].to_string()
            };
            attrs.push((name, Some(value)));
        } else {
            attrs.push((name, None));
        }
    }
    attrs
}

/// Byte offset of the next `<Name` opening (with boundary check) in `s`.
fn find_tag_open(s: &str, name: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = s[from..].find('<') {
        let at = from + rel;
        let after = &s[at + 1..];
        if after.starts_with(name) {
            let boundary = after[name.len()..].chars().next();
            if !matches!(boundary, Some(c) if c.is_ascii_alphanumeric()) {
                return Some(at);
            }
        }
        from = at + 1;
    }
    None
}

/// Find the matching `</Name>` for an already-consumed opening tag, counting
/// nested openings of the same tag and skipping fenced code regions.
///
/// Returns `(inner_end, close_end)`: the byte offsets (into `s`) of the end
/// of the inner content and the end of the closing tag.
fn find_matching_close(s: &str, name: &str) -> Option<(usize, usize)> {
    let closing = format!("</{name}>");
    let mut depth = 1usize;
    let mut i = 0;
    let bytes = s.as_bytes();

    while i < bytes.len() {
        // Skip fenced code: a close tag inside a fence is literal content.
        let at_line_start = i == 0 || bytes[i - 1] == b'\n';
        if at_line_start && s[i..].starts_with("```") {
            let ticks = s[i..].chars().take_while(|&c| c == '`').count();
            let line_end = s[i..].find('\n').map(|n| i + n + 1).unwrap_or(s.len());
            let mut j = line_end;
            i = s.len();
            while j < s.len() {
                let next = s[j..].find('\n').map(|n| j + n + 1).unwrap_or(s.len());
                if is_closing_fence(s[j..next].trim_end(), ticks) {
                    i = next;
                    break;
                }
                j = next;
            }
            continue;
        }

        if bytes[i] == b'<' {
            if s[i..].starts_with(&closing) {
                depth -= 1;
                if depth == 0 {
                    return Some((i, i + closing.len()));
                }
                i += closing.len();
                continue;
            }
            if is_tag_open_at(s, i, name) {
                depth += 1;
            }
        }
        i += 1;
    }
    None
}

fn is_tag_open_at(s: &str, at: usize, name: &str) -> bool {
    let after = &s[at + 1..];
    if !after.starts_with(name) {
        return false;
    }
    let boundary = after[name.len()..].chars().next();
    !matches!(boundary, Some(c) if c.is_ascii_alphanumeric())
}
