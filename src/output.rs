//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every page is its semantic identity — title and document id — with
//! filesystem detail (source origin, output path) shown as secondary
//! context via indented lines.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 Introduction (introduction)
//!     Source: content/introduction.mdx
//!     Output: introduction.html
//! 002 Missing Page (guides/missing-page)
//!     Source: placeholder
//!     Output: guides/missing-page.html
//!
//! Built 2 pages (1 placeholder) -> dist
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 content/broken.md (broken)
//!     malformed directive: unclosed <Callout> at line 3
//!
//! 1 page failed strict compile
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::loader::Origin;
use crate::site::BuildSummary;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn origin_line(origin: &Origin) -> String {
    match origin {
        Origin::Disk(path) => format!("    Source: {}", path.display()),
        Origin::Builtin => "    Source: built-in".to_string(),
        Origin::Placeholder => "    Source: placeholder".to_string(),
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output: one entry per generated page plus a summary line.
pub fn format_build_output(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Pages".to_string());
    for (i, page) in summary.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            page.title,
            page.id
        ));
        lines.push(origin_line(&page.origin));
        lines.push(format!("    Output: {}", page.output));
        if page.fell_back {
            lines.push("    Note: strict compile failed, rendered leniently".to_string());
        }
    }

    let placeholders = summary
        .pages
        .iter()
        .filter(|p| p.origin == Origin::Placeholder)
        .count();
    lines.push(String::new());
    let mut tally = format!("Built {} pages", summary.pages.len());
    if placeholders > 0 {
        tally.push_str(&format!(" ({placeholders} placeholder)"));
    }
    tally.push_str(&format!(" -> {}", summary.output_dir.display()));
    lines.push(tally);

    lines
}

pub fn print_build_output(summary: &BuildSummary) {
    for line in format_build_output(summary) {
        println!("{line}");
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format check output: one entry per page that failed strict compile.
pub fn format_check_output(failures: &[(String, String)]) -> Vec<String> {
    let mut lines = Vec::new();

    if failures.is_empty() {
        lines.push("All pages pass strict compile".to_string());
        return lines;
    }

    for (i, (id, diagnostic)) in failures.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), id));
        lines.push(format!("    {diagnostic}"));
    }
    lines.push(String::new());
    let noun = if failures.len() == 1 { "page" } else { "pages" };
    lines.push(format!("{} {noun} failed strict compile", failures.len()));

    lines
}

pub fn print_check_output(failures: &[(String, String)]) {
    for line in format_check_output(failures) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::PageReport;
    use std::path::PathBuf;

    fn summary() -> BuildSummary {
        BuildSummary {
            pages: vec![
                PageReport {
                    id: "introduction".into(),
                    title: "Introduction".into(),
                    origin: Origin::Disk(PathBuf::from("content/introduction.mdx")),
                    fell_back: false,
                    output: "introduction.html".into(),
                },
                PageReport {
                    id: "guides/missing".into(),
                    title: "Missing".into(),
                    origin: Origin::Placeholder,
                    fell_back: true,
                    output: "guides/missing.html".into(),
                },
            ],
            output_dir: PathBuf::from("dist"),
        }
    }

    #[test]
    fn build_output_leads_with_title_and_id() {
        let lines = format_build_output(&summary());
        assert_eq!(lines[0], "Pages");
        assert_eq!(lines[1], "001 Introduction (introduction)");
        assert_eq!(lines[2], "    Source: content/introduction.mdx");
        assert_eq!(lines[3], "    Output: introduction.html");
    }

    #[test]
    fn build_output_marks_fallback_and_placeholder() {
        let lines = format_build_output(&summary());
        assert!(lines.contains(&"    Source: placeholder".to_string()));
        assert!(
            lines.contains(&"    Note: strict compile failed, rendered leniently".to_string())
        );
        assert_eq!(
            lines.last().unwrap(),
            "Built 2 pages (1 placeholder) -> dist"
        );
    }

    #[test]
    fn check_output_empty_means_clean() {
        let lines = format_check_output(&[]);
        assert_eq!(lines, vec!["All pages pass strict compile".to_string()]);
    }

    #[test]
    fn check_output_lists_failures() {
        let failures = vec![(
            "broken".to_string(),
            "malformed directive: unclosed tag".to_string(),
        )];
        let lines = format_check_output(&failures);
        assert_eq!(lines[0], "001 broken");
        assert_eq!(lines[1], "    malformed directive: unclosed tag");
        assert_eq!(lines.last().unwrap(), "1 page failed strict compile");
    }
}
