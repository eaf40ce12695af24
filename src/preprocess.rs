//! Canonical-Markdown serialization.
//!
//! `preprocess` turns raw MDX-flavored content into plain GFM that any
//! Markdown renderer understands, with every custom construct degraded to a
//! standard equivalent:
//!
//! | Source construct          | Canonical form                               |
//! |---------------------------|----------------------------------------------|
//! | frontmatter block         | stripped                                     |
//! | `<Callout type="x">`      | blockquote with a `> **X:** ` first line     |
//! | `<TabGroup>`/`<Tab>`      | one `### title` section per tab, in order    |
//! | `<img ...>` attributes    | hash-fragment params on the image URL        |
//! | `import`/`export` lines   | stripped (pasted component source cleanup)   |
//! | fenced code               | untouched, byte-identical content            |
//!
//! The transform goes through the structural tree from [`crate::directive`],
//! so nesting (a callout containing a tab group) serializes correctly and
//! code fences need no protect/restore pass. Preprocessing already-canonical
//! text is a no-op: canonical output contains no custom tags.

use crate::directive::{self, Node, TabItem};
use crate::frontmatter;

/// Rewrite raw content into canonical GFM Markdown.
pub fn preprocess(raw: &str) -> String {
    let (_, body) = frontmatter::split(raw);
    let nodes = directive::parse(body);
    let mut out = String::new();
    serialize_nodes(&nodes, &mut out);

    let trimmed = out.trim_start_matches('\n').trim_end_matches('\n');
    let mut canonical = trimmed.to_string();
    canonical.push('\n');
    canonical
}

fn serialize_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => serialize_text(text, out),
            Node::CodeFence { fence, info, body } => serialize_fence(fence, info, body, out),
            Node::Callout { kind, children } => {
                let mut inner = String::new();
                serialize_nodes(children, &mut inner);
                let body = inner.trim();

                ensure_blank_line(out);
                for (i, line) in body.lines().enumerate() {
                    if i == 0 {
                        out.push_str(&format!("> **{}:** {}\n", kind.label(), line));
                    } else if line.is_empty() {
                        out.push_str(">\n");
                    } else {
                        out.push_str(&format!("> {line}\n"));
                    }
                }
                if body.is_empty() {
                    out.push_str(&format!("> **{}:**\n", kind.label()));
                }
                out.push('\n');
            }
            Node::TabGroup { tabs } => {
                for TabItem { title, children } in tabs {
                    let mut inner = String::new();
                    serialize_nodes(children, &mut inner);
                    ensure_blank_line(out);
                    out.push_str(&format!("### {title}\n\n"));
                    out.push_str(inner.trim());
                    out.push_str("\n\n");
                }
            }
            Node::Image(img) => {
                let markdown = format!("![{}]({})", img.alt, img.encoded_src());
                match &img.link {
                    Some(href) => out.push_str(&format!("[{markdown}]({href})")),
                    None => out.push_str(&markdown),
                }
            }
        }
    }
}

/// Copy text through, dropping leftover module import/export lines that
/// arrive when component source gets pasted into content. Newline runs
/// bordering a directive collapse to a single blank line so the canonical
/// output doesn't accumulate vertical space.
fn serialize_text(text: &str, out: &mut String) {
    let text = if out.ends_with("\n\n") {
        text.trim_start_matches('\n')
    } else {
        text
    };
    if text.trim().is_empty() {
        if !text.is_empty() {
            ensure_blank_line(out);
        }
        return;
    }
    for line in text.split_inclusive('\n') {
        if is_module_line(line) {
            continue;
        }
        out.push_str(line);
    }
}

pub(crate) fn is_module_line(line: &str) -> bool {
    let trimmed = line.trim();
    (trimmed.starts_with("import ") && trimmed.contains(" from "))
        || trimmed.starts_with("export ")
}

fn serialize_fence(fence: &str, info: &str, body: &str, out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(fence);
    out.push_str(info);
    out.push('\n');
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(fence);
    out.push('\n');
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontmatter_is_stripped() {
        let raw = "---\ntitle: T\n---\n\n# Hello\n";
        assert_eq!(preprocess(raw), "# Hello\n");
    }

    #[test]
    fn callout_becomes_marked_blockquote() {
        let canonical = preprocess("<Callout type=\"warning\">\nMind the gap.\n</Callout>");
        assert_eq!(canonical, "> **Warning:** Mind the gap.\n");
    }

    #[test]
    fn multiline_callout_body_stays_one_blockquote() {
        let canonical = preprocess("<Note>first\n\nsecond</Note>");
        assert_eq!(canonical, "> **Note:** first\n>\n> second\n");
    }

    #[test]
    fn tabs_degrade_to_level_three_headings() {
        let canonical = preprocess(
            "<TabGroup><Tab title=\"A\">x</Tab><Tab title=\"B\">y</Tab></TabGroup>",
        );
        assert_eq!(canonical, "### A\n\nx\n\n### B\n\ny\n");
    }

    #[test]
    fn image_attributes_encode_as_hash_params() {
        let canonical = preprocess(r#"<img src="pic.png" alt="Pic" width="300" data-theme="dark">"#);
        assert_eq!(canonical, "![Pic](pic.png#w=300&theme=dark)\n");
    }

    #[test]
    fn linked_image_keeps_anchor() {
        let canonical = preprocess(r#"<a href="https://x.dev"><img src="p.png" alt="P"></a>"#);
        assert_eq!(canonical, "[![P](p.png)](https://x.dev)\n");
    }

    #[test]
    fn code_fence_content_untouched() {
        let body = "<Callout type=\"error\">looks like a callout</Callout>\n![img](x#theme=dark)\n";
        let raw = format!("before\n\n```md\n{body}```\n\nafter\n");
        let canonical = preprocess(&raw);
        assert!(canonical.contains(body), "fence body altered:\n{canonical}");
    }

    #[test]
    fn import_and_export_lines_stripped() {
        let raw = "import { Callout } from '../components/Callout';\n\n# Doc\n\nexport default Doc;\n";
        let canonical = preprocess(raw);
        assert!(!canonical.contains("import"));
        assert!(!canonical.contains("export"));
        assert!(canonical.contains("# Doc"));
    }

    #[test]
    fn import_like_prose_is_kept() {
        let canonical = preprocess("We import data from the API.\n");
        assert!(canonical.contains("We import data from the API."));
    }

    #[test]
    fn import_inside_fence_is_kept() {
        let raw = "```js\nimport x from 'y';\n```\n";
        let canonical = preprocess(raw);
        assert!(canonical.contains("import x from 'y';"));
    }

    #[test]
    fn nested_callout_in_tab_serializes_nested() {
        let raw = "<TabGroup><Tab title=\"T\"><Warning>careful</Warning></Tab></TabGroup>";
        let canonical = preprocess(raw);
        assert!(canonical.contains("### T"));
        assert!(canonical.contains("> **Warning:** careful"));
    }

    #[test]
    fn nested_tab_group_in_callout_prefixes_quotes() {
        let raw = "<Callout type=\"info\"><TabGroup><Tab title=\"T\">x</Tab></TabGroup></Callout>";
        let canonical = preprocess(raw);
        assert!(canonical.contains("> **Info:** ### T"));
        assert!(canonical.contains("> x"));
    }

    #[test]
    fn malformed_tag_passes_through_literally() {
        let raw = "<Callout type=\"tip\">never closed\n";
        let canonical = preprocess(raw);
        assert!(canonical.contains("<Callout type=\"tip\">never closed"));
    }

    #[test]
    fn preprocess_is_idempotent_on_canonical_output() {
        let raw = "---\ntitle: T\n---\n<Warning>careful</Warning>\n\n<TabGroup><Tab title=\"A\">x</Tab></TabGroup>\n\n```rs\nlet a = 1;\n```\n";
        let once = preprocess(raw);
        let twice = preprocess(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn plain_markdown_unchanged() {
        let raw = "# Title\n\nPlain **bold** paragraph.\n\n- a\n- b\n";
        assert_eq!(preprocess(raw), raw);
    }
}
