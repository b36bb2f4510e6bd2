//! Shared test utilities for the prompt-catalog test suite.
//!
//! Provides fixture setup, document writers, and lookup helpers that work
//! with built catalogs (`Catalog`, `ContentNode`, `CategoryNode`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let catalog = build(tmp.path(), &SiteConfig::default()).unwrap();
//!
//! let skill = find_node(&catalog, "skills/pdf-tools");
//! assert_eq!(skill.references.len(), 3);
//! assert_eq!(walk_slugs(&catalog), FIXTURE_ORDER.to_vec());
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::catalog::{Catalog, CategoryNode, ContentNode, Node};

/// Navigation pre-order of every document in `fixtures/content/`.
pub const FIXTURE_ORDER: &[&str] = &[
    "prompts/code-review",
    "prompts/writing/blog-post",
    "prompts/writing/summarize",
    "prompts/debugging",
    "skills/commit-helper",
    "skills/pdf-tools",
    "skills/pdf-tools/references/api",
    "skills/pdf-tools/references/forms",
    "skills/pdf-tools/troubleshooting",
    "getting-started",
];

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a document with a title-only frontmatter, creating parent dirs.
pub fn write_doc(root: &Path, rel: &str, title: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("---\ntitle: {title}\n---\n{body}")).unwrap();
}

// =========================================================================
// Catalog lookups (panic with a clear message on miss)
// =========================================================================

/// Find a content node by slug. Panics if not found.
pub fn find_node<'a>(catalog: &'a Catalog, slug: &str) -> &'a ContentNode {
    catalog.get(slug).map(|n| n.as_ref()).unwrap_or_else(|| {
        let mut slugs: Vec<&str> = catalog.slugs().collect();
        slugs.sort();
        panic!("slug '{slug}' not found. Available: {slugs:?}")
    })
}

/// Follow category identifiers from the root. Panics if any is missing.
pub fn find_category<'a>(catalog: &'a Catalog, path: &[&str]) -> &'a CategoryNode {
    let mut current = catalog.root();
    for id in path {
        current = current
            .children
            .iter()
            .find_map(|c| match c {
                Node::Category(cat) if cat.identifier == *id => Some(cat),
                _ => None,
            })
            .unwrap_or_else(|| panic!("category '{id}' not found in path {path:?}"));
    }
    current
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Slugs in navigation pre-order.
pub fn walk_slugs(catalog: &Catalog) -> Vec<&str> {
    catalog.walk().into_iter().map(|n| n.slug.as_str()).collect()
}

/// Titles of the direct child categories.
pub fn category_titles(category: &CategoryNode) -> Vec<&str> {
    category
        .children
        .iter()
        .filter_map(|c| match c {
            Node::Category(cat) => Some(cat.title.as_str()),
            Node::Content(_) => None,
        })
        .collect()
}
