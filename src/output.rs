//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity
//! (category, prompt, skill, reference) leads with its positional index and
//! navigation title; source paths follow as indented `Source:` lines. The
//! tree reads as a content inventory while still pointing back to files.
//!
//! # Output Format
//!
//! ## Tree
//!
//! ```text
//! 001 Prompt Library
//!     001 Code Review
//!         Source: prompts/code-review.md
//!     002 Writing Prompts
//!         001 Blog Post
//!             Source: prompts/writing/blog-post.mdx
//! 002 Skills
//!     001 PDF Tools (skill, 3 references)
//!         Source: skills/pdf-tools/SKILL.md
//!         001 API Reference
//!             Source: skills/pdf-tools/references/api.md
//! ```
//!
//! ## Check
//!
//! ```text
//! Catalog OK: 10 documents (5 prompts, 2 skills, 3 references) in 3 categories
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::archive::{ArchiveManifest, BundleCheck, BundleIndex, BundleStatus};
use crate::catalog::{Catalog, CategoryNode, ContentKind, ContentNode, Node};
use crate::views::{ContentDocument, ListingEntry};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 PDF Tools (skill, 3 references)
/// 002 Code Review
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Tree
// ============================================================================

/// Format the navigation tree with positional indices per sibling level.
pub fn format_tree(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    format_category(catalog.root(), 0, &mut lines);
    if lines.is_empty() {
        lines.push("(empty catalog)".to_string());
    }
    lines
}

fn format_category(category: &CategoryNode, depth: usize, lines: &mut Vec<String>) {
    for (i, child) in category.children.iter().enumerate() {
        match child {
            Node::Category(sub) => {
                lines.push(format!(
                    "{}{}",
                    indent(depth),
                    entity_header(i + 1, &sub.title, None)
                ));
                format_category(sub, depth + 1, lines);
            }
            Node::Content(node) => format_content(node, i + 1, depth, lines),
        }
    }
}

fn format_content(node: &ContentNode, position: usize, depth: usize, lines: &mut Vec<String>) {
    let detail = match node.kind {
        ContentKind::Skill if node.references.is_empty() => Some("skill".to_string()),
        ContentKind::Skill => Some(format!(
            "skill, {}",
            plural(node.references.len(), "reference")
        )),
        _ => None,
    };
    lines.push(format!(
        "{}{}",
        indent(depth),
        entity_header(position, &node.nav_title, detail.as_deref())
    ));
    lines.push(format!(
        "{}    Source: {}",
        indent(depth),
        node.source_path.display()
    ));
    if let Some(desc) = &node.description {
        lines.push(format!("{}    {}", indent(depth), truncate_desc(desc, 60)));
    }
    for (j, reference) in node.references.iter().enumerate() {
        format_content(reference, j + 1, depth + 1, lines);
    }
}

/// Print the navigation tree to stdout.
pub fn print_tree(catalog: &Catalog) {
    for line in format_tree(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

fn count_categories(category: &CategoryNode) -> usize {
    category
        .children
        .iter()
        .map(|child| match child {
            Node::Category(sub) => 1 + count_categories(sub),
            Node::Content(_) => 0,
        })
        .sum()
}

/// One-line summary of a successfully built catalog.
pub fn format_check_summary(catalog: &Catalog) -> String {
    let nodes = catalog.walk();
    let count = |kind: ContentKind| nodes.iter().filter(|n| n.kind == kind).count();
    let categories = match count_categories(catalog.root()) {
        1 => "1 category".to_string(),
        n => format!("{n} categories"),
    };
    format!(
        "Catalog OK: {} ({}, {}, {}) in {}",
        plural(nodes.len(), "document"),
        plural(count(ContentKind::Prompt), "prompt"),
        plural(count(ContentKind::Skill), "skill"),
        plural(count(ContentKind::Reference), "reference"),
        categories,
    )
}

// ============================================================================
// Listing and single documents
// ============================================================================

/// Aligned `slug  kind  title` rows.
pub fn format_listing(entries: &[ListingEntry]) -> Vec<String> {
    let width = entries.iter().map(|e| e.slug.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| {
            format!(
                "{:<width$}  {:<9}  {}",
                e.slug,
                e.kind.as_str(),
                e.title,
                width = width
            )
        })
        .collect()
}

pub fn print_listing(entries: &[ListingEntry]) {
    for line in format_listing(entries) {
        println!("{}", line);
    }
}

/// Header block for `show`: title, slug, and metadata, then the body.
pub fn format_document(doc: &ContentDocument) -> Vec<String> {
    let mut lines = vec![
        doc.title.clone(),
        format!("    Slug: {}", doc.slug),
        format!("    Kind: {}", doc.kind.as_str()),
    ];
    if !doc.category_path.is_empty() {
        lines.push(format!("    Category: {}", doc.category_path.join(" / ")));
    }
    if let Some(desc) = &doc.description {
        lines.push(format!("    Description: {}", desc));
    }
    for reference in &doc.references {
        lines.push(format!("    Reference: {}", reference));
    }
    lines.push(String::new());
    lines.push(doc.body.clone());
    lines
}

// ============================================================================
// Archives
// ============================================================================

/// Manifest entries with their sizes.
pub fn format_manifest(manifest: &ArchiveManifest) -> Vec<String> {
    let mut lines: Vec<String> = manifest
        .entries
        .iter()
        .map(|e| format!("{} ({} bytes)", e.path, e.content.len()))
        .collect();
    lines.push(format!("{} in archive", plural(manifest.entries.len(), "file")));
    lines
}

pub fn print_manifest(manifest: &ArchiveManifest) {
    for line in format_manifest(manifest) {
        println!("{}", line);
    }
}

/// Written bundles with abbreviated digests.
pub fn format_bundle_index(index: &BundleIndex) -> Vec<String> {
    let mut lines: Vec<String> = index
        .bundles
        .iter()
        .map(|b| {
            let short = b.sha256.get(..12).unwrap_or(&b.sha256);
            format!(
                "{} \u{2192} {} [{}, sha256 {}]",
                b.name,
                b.file,
                plural(b.entries, "file"),
                short
            )
        })
        .collect();
    lines.push(format!("Wrote {}", plural(index.bundles.len(), "bundle")));
    lines
}

pub fn print_bundle_index(index: &BundleIndex) {
    for line in format_bundle_index(index) {
        println!("{}", line);
    }
}

/// Per-bundle status lines plus a summary.
pub fn format_verify(checks: &[BundleCheck]) -> Vec<String> {
    let mut lines: Vec<String> = checks
        .iter()
        .map(|c| {
            let status = match c.status {
                BundleStatus::Current => "ok",
                BundleStatus::Stale => "stale",
                BundleStatus::Missing => "missing",
                BundleStatus::Orphaned => "orphan",
            };
            format!("{:<7} {}", status, c.file)
        })
        .collect();
    let bad = checks
        .iter()
        .filter(|c| c.status != BundleStatus::Current)
        .count();
    if bad == 0 {
        lines.push(format!("All {} up to date", plural(checks.len(), "bundle")));
    } else {
        lines.push(format!("{} out of date", plural(bad, "bundle")));
    }
    lines
}

pub fn print_verify(checks: &[BundleCheck]) {
    for line in format_verify(checks) {
        println!("{}", line);
    }
}
