//! Content resolution: document id → raw page text.
//!
//! A document id is a slash-separated path like `guides/getting-started`,
//! no extension, no leading slash. Resolution walks three tiers in order:
//!
//! 1. **Disk**: each configured content root is probed for `<id>.mdx` then
//!    `<id>.md`, first hit wins.
//! 2. **Built-in**: a small compiled-in set of demo pages, so a fresh
//!    checkout renders something before any content directory exists.
//! 3. **Placeholder**: a generated stub page whose title is derived from
//!    the last id segment (`getting-started` → "Getting Started").
//!
//! Missing or unreadable content never fails resolution — the placeholder
//! tier always answers. The one deliberate exception: ids that would escape
//! the content roots (`..`, absolute paths, empty) are rejected with
//! [`LoadError::InvalidId`] before any probing, since such an id names a
//! location rather than a document.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
}

/// Where a resolved document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Read from a content root on disk.
    Disk(PathBuf),
    /// One of the compiled-in demo pages.
    Builtin,
    /// Generated stub; nothing matched the id.
    Placeholder,
}

/// A resolved document, raw text not yet preprocessed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDoc {
    pub id: String,
    pub origin: Origin,
    pub raw: String,
}

impl LoadedDoc {
    pub fn is_placeholder(&self) -> bool {
        self.origin == Origin::Placeholder
    }
}

/// Extensions probed per root, in priority order.
const EXTENSIONS: &[&str] = &["mdx", "md"];

/// Compiled-in demo pages, keyed by document id.
const BUILTIN_DOCS: &[(&str, &str)] = &[
    ("introduction", include_str!("../content/introduction.mdx")),
    (
        "getting-started",
        include_str!("../content/getting-started.mdx"),
    ),
    ("components", include_str!("../content/components.mdx")),
];

#[derive(Debug, Clone)]
pub struct Loader {
    roots: Vec<PathBuf>,
}

impl Loader {
    pub fn new(roots: Vec<PathBuf>) -> Loader {
        Loader { roots }
    }

    /// Resolve an id through disk, built-ins, and the placeholder tier.
    pub fn load(&self, id: &str) -> Result<LoadedDoc, LoadError> {
        let id = normalize_id(id)?;

        for candidate in self.candidates(&id) {
            // An unreadable candidate counts as a miss; the next tier answers.
            if let Ok(raw) = fs::read_to_string(&candidate) {
                return Ok(LoadedDoc {
                    id,
                    origin: Origin::Disk(candidate),
                    raw,
                });
            }
        }

        if let Some((_, raw)) = BUILTIN_DOCS.iter().find(|(key, _)| *key == id) {
            return Ok(LoadedDoc {
                id,
                origin: Origin::Builtin,
                raw: (*raw).to_string(),
            });
        }

        let raw = placeholder_page(&id);
        Ok(LoadedDoc {
            id,
            origin: Origin::Placeholder,
            raw,
        })
    }

    /// All document ids visible to this loader: every `.mdx`/`.md` under the
    /// content roots (deduplicated, disk shadows built-ins) plus built-ins.
    pub fn all_ids(&self) -> Result<Vec<String>, LoadError> {
        let mut ids = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in walkdir::WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let is_doc = path
                    .extension()
                    .map(|e| EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
                    .unwrap_or(false);
                if !is_doc {
                    continue;
                }
                if let Ok(rel) = path.strip_prefix(root) {
                    let mut id = rel.with_extension("").to_string_lossy().replace('\\', "/");
                    if id.starts_with('/') {
                        id.remove(0);
                    }
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        for (key, _) in BUILTIN_DOCS {
            let key = (*key).to_string();
            if !ids.contains(&key) {
                ids.push(key);
            }
        }
        Ok(ids)
    }

    /// Candidate paths for an id, in probe order.
    fn candidates(&self, id: &str) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.roots.len() * EXTENSIONS.len());
        for root in &self.roots {
            for ext in EXTENSIONS {
                paths.push(root.join(format!("{id}.{ext}")));
            }
        }
        paths
    }
}

/// Reject ids that could escape the content roots, strip leading slashes
/// and a trailing `.md`/`.mdx` the caller may have left on.
fn normalize_id(id: &str) -> Result<String, LoadError> {
    let trimmed = id.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(LoadError::InvalidId(id.to_string()));
    }
    let trimmed = trimmed
        .strip_suffix(".mdx")
        .or_else(|| trimmed.strip_suffix(".md"))
        .unwrap_or(trimmed);
    let escapes = Path::new(trimmed)
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if escapes {
        return Err(LoadError::InvalidId(id.to_string()));
    }
    Ok(trimmed.to_string())
}

/// "getting-started" → "Getting Started": last segment, hyphens to spaces,
/// each word capitalized.
pub fn placeholder_title(id: &str) -> String {
    let segment = id.rsplit('/').next().unwrap_or(id);
    segment
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn placeholder_page(id: &str) -> String {
    let title = placeholder_title(id);
    format!(
        "# {title}\n\n\
         > **Info:** This page hasn't been written yet.\n\n\
         Content for `{id}` will appear here once it exists in a content \
         directory.\n"
    )
}
