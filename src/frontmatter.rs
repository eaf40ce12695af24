//! Frontmatter parsing.
//!
//! Documents may open with a `---`-delimited block of `key: value` lines:
//!
//! ```text
//! ---
//! title: Installation
//! description: How to install the thing
//! lastUpdated: 2026-05-01
//! category: Getting Started
//! ---
//! ```
//!
//! Absence is valid: the title then falls back to the first `# heading`,
//! and finally to a title derived from the document identifier. A block
//! without a closing `---` is not frontmatter — it stays in the body.

use std::collections::BTreeMap;

/// Parsed frontmatter metadata. All fields optional; unknown keys are kept
/// in `extra` so nothing from the source is silently lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub last_updated: Option<String>,
    pub category: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Whether the metadata strip (category, last-updated chips) has
    /// anything to show.
    pub fn has_metadata(&self) -> bool {
        self.category.is_some() || self.last_updated.is_some()
    }

    fn parse_block(block: &str) -> Frontmatter {
        let mut fm = Frontmatter::default();
        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().to_string();
            match key {
                "title" => fm.title = Some(value),
                "description" => fm.description = Some(value),
                "lastUpdated" | "last_updated" => fm.last_updated = Some(value),
                "category" => fm.category = Some(value),
                _ if !key.is_empty() => {
                    fm.extra.insert(key.to_string(), value);
                }
                _ => {}
            }
        }
        fm
    }
}

/// Split a raw document into its frontmatter (if any) and body.
///
/// The block must start on the very first line. The body begins after the
/// closing `---` line, with one leading blank line trimmed.
pub fn split(raw: &str) -> (Option<Frontmatter>, &str) {
    let Some(after_open) = raw.strip_prefix("---\n").or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let block = &after_open[..offset];
            let mut body = &after_open[offset + line.len()..];
            body = body.strip_prefix('\n').unwrap_or(body);
            return (Some(Frontmatter::parse_block(block)), body);
        }
        offset += line.len();
    }

    // No closing delimiter: not frontmatter at all.
    (None, raw)
}

/// First `# heading` text in a body, the no-frontmatter title convention.
pub fn title_from_heading(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\ntitle: Installation\ndescription: Install guide\nlastUpdated: 2026-05-01\ncategory: Getting Started\n---\n\n# Installation\n\nBody text.\n";

    #[test]
    fn parses_known_keys() {
        let (fm, body) = split(DOC);
        let fm = fm.unwrap();
        assert_eq!(fm.title.as_deref(), Some("Installation"));
        assert_eq!(fm.description.as_deref(), Some("Install guide"));
        assert_eq!(fm.last_updated.as_deref(), Some("2026-05-01"));
        assert_eq!(fm.category.as_deref(), Some("Getting Started"));
        assert_eq!(body, "# Installation\n\nBody text.\n");
    }

    #[test]
    fn unknown_keys_kept_in_extra() {
        let (fm, _) = split("---\ntitle: T\nauthor: someone\n---\nbody");
        let fm = fm.unwrap();
        assert_eq!(fm.extra.get("author").map(String::as_str), Some("someone"));
    }

    #[test]
    fn no_frontmatter_returns_whole_body() {
        let (fm, body) = split("# Just a doc\n\ncontent");
        assert!(fm.is_none());
        assert_eq!(body, "# Just a doc\n\ncontent");
    }

    #[test]
    fn unterminated_block_is_body() {
        let raw = "---\ntitle: Broken\n\nno closing line";
        let (fm, body) = split(raw);
        assert!(fm.is_none());
        assert_eq!(body, raw);
    }

    #[test]
    fn block_must_start_on_first_line() {
        let raw = "\n---\ntitle: Late\n---\nbody";
        let (fm, _) = split(raw);
        assert!(fm.is_none());
    }

    #[test]
    fn values_with_colons_keep_everything_after_first() {
        let (fm, _) = split("---\ntitle: Part one: part two\n---\nbody");
        assert_eq!(fm.unwrap().title.as_deref(), Some("Part one: part two"));
    }

    #[test]
    fn heading_title_fallback() {
        assert_eq!(
            title_from_heading("intro line\n\n# The Title\n\nmore"),
            Some("The Title".to_string())
        );
        assert_eq!(title_from_heading("no heading here"), None);
    }
}
