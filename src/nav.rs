//! Navigation tree.
//!
//! The sidebar structure comes from the `[[nav]]` entries in `docs.toml`:
//!
//! ```toml
//! [[nav]]
//! kind = "doc"
//! id = "introduction"
//!
//! [[nav]]
//! kind = "section"
//! label = "Guides"
//!
//!   [[nav.children]]
//!   kind = "doc"
//!   id = "guides/install"
//!   label = "Installation"
//!
//! [[nav]]
//! kind = "link"
//! label = "GitHub"
//! url = "https://github.com/example/opendocs"
//! ```
//!
//! A doc entry without a label falls back to the placeholder title derived
//! from its id. When no nav is configured at all, a flat tree is built from
//! every id the loader can see.

use crate::loader::placeholder_title;
use serde::{Deserialize, Serialize};

/// One node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavNode {
    /// An internal document, routed by id.
    Doc {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// A grouping header with children, not itself a page. Accepts
    /// `kind = "category"` as a synonym.
    #[serde(alias = "category")]
    Section {
        label: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NavNode>,
    },
    /// An external link.
    Link { label: String, url: String },
}

impl NavNode {
    /// Display label: explicit label, or the title derived from the doc id.
    pub fn label(&self) -> String {
        match self {
            NavNode::Doc { id, label } => label
                .clone()
                .unwrap_or_else(|| placeholder_title(id)),
            NavNode::Section { label, .. } | NavNode::Link { label, .. } => label.clone(),
        }
    }
}

/// Depth-first walk over the doc ids in a nav tree, in display order.
pub fn doc_ids(nodes: &[NavNode]) -> Vec<&str> {
    let mut ids = Vec::new();
    collect_doc_ids(nodes, &mut ids);
    ids
}

fn collect_doc_ids<'a>(nodes: &'a [NavNode], ids: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            NavNode::Doc { id, .. } => ids.push(id),
            NavNode::Section { children, .. } => collect_doc_ids(children, ids),
            NavNode::Link { .. } => {}
        }
    }
}

/// Path from the root to the doc entry with this id, for breadcrumbs.
/// Returns the labels of the sections passed plus the doc's own label.
pub fn breadcrumb(nodes: &[NavNode], target: &str) -> Option<Vec<String>> {
    for node in nodes {
        match node {
            NavNode::Doc { id, .. } if id == target => {
                return Some(vec![node.label()]);
            }
            NavNode::Section { label, children } => {
                if let Some(mut trail) = breadcrumb(children, target) {
                    trail.insert(0, label.clone());
                    return Some(trail);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fallback tree when `docs.toml` has no `[[nav]]` entries: one flat doc
/// entry per id, in the order the loader reports them.
pub fn flat_nav(ids: &[String]) -> Vec<NavNode> {
    ids.iter()
        .map(|id| NavNode::Doc {
            id: id.clone(),
            label: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<NavNode> {
        vec![
            NavNode::Doc {
                id: "introduction".into(),
                label: None,
            },
            NavNode::Section {
                label: "Guides".into(),
                children: vec![
                    NavNode::Doc {
                        id: "guides/install".into(),
                        label: Some("Installation".into()),
                    },
                    NavNode::Doc {
                        id: "guides/deploy".into(),
                        label: None,
                    },
                ],
            },
            NavNode::Link {
                label: "GitHub".into(),
                url: "https://github.com/example".into(),
            },
        ]
    }

    #[test]
    fn doc_ids_walks_depth_first() {
        assert_eq!(
            doc_ids(&sample()),
            vec!["introduction", "guides/install", "guides/deploy"]
        );
    }

    #[test]
    fn label_falls_back_to_title_from_id() {
        let nav = sample();
        assert_eq!(nav[0].label(), "Introduction");
        let NavNode::Section { children, .. } = &nav[1] else {
            panic!("expected section");
        };
        assert_eq!(children[0].label(), "Installation");
        assert_eq!(children[1].label(), "Deploy");
    }

    #[test]
    fn breadcrumb_includes_section_labels() {
        assert_eq!(
            breadcrumb(&sample(), "guides/install"),
            Some(vec!["Guides".to_string(), "Installation".to_string()])
        );
        assert_eq!(
            breadcrumb(&sample(), "introduction"),
            Some(vec!["Introduction".to_string()])
        );
        assert_eq!(breadcrumb(&sample(), "missing"), None);
    }

    #[test]
    fn nav_deserializes_from_toml() {
        let toml = r#"
[[nav]]
kind = "doc"
id = "introduction"

[[nav]]
kind = "section"
label = "Guides"

  [[nav.children]]
  kind = "doc"
  id = "guides/install"
  label = "Installation"

[[nav]]
kind = "link"
label = "GitHub"
url = "https://github.com/example"
"#;
        #[derive(Deserialize)]
        struct Wrapper {
            nav: Vec<NavNode>,
        }
        let parsed: Wrapper = toml::from_str(toml).unwrap();
        assert_eq!(parsed.nav.len(), 3);
        assert_eq!(
            parsed.nav[0],
            NavNode::Doc {
                id: "introduction".into(),
                label: None,
            }
        );
        assert_eq!(
            parsed.nav[1],
            NavNode::Section {
                label: "Guides".into(),
                children: vec![NavNode::Doc {
                    id: "guides/install".into(),
                    label: Some("Installation".into()),
                }],
            }
        );
        assert!(matches!(&parsed.nav[2], NavNode::Link { url, .. }
            if url == "https://github.com/example"));
    }

    #[test]
    fn category_kind_is_a_section() {
        let toml = r#"
[[nav]]
kind = "category"
label = "API"

  [[nav.children]]
  kind = "doc"
  id = "api/errors"
"#;
        #[derive(Deserialize)]
        struct Wrapper {
            nav: Vec<NavNode>,
        }
        let parsed: Wrapper = toml::from_str(toml).unwrap();
        assert!(matches!(&parsed.nav[0], NavNode::Section { label, .. } if label == "API"));
    }

    #[test]
    fn flat_nav_from_ids() {
        let ids = vec!["a".to_string(), "b/c".to_string()];
        let nav = flat_nav(&ids);
        assert_eq!(doc_ids(&nav), vec!["a", "b/c"]);
    }
}
