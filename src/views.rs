//! Read-only projections of a [`Catalog`].
//!
//! Every function here is pure: it reads an already built catalog and never
//! touches the filesystem. Ordered views go through [`Catalog::walk`], so the
//! listing, the aggregated export, and the archive manifests all agree on
//! order.
//!
//! ## Aggregated export format
//!
//! Each document becomes one block; blocks are separated by a blank line.
//!
//! ```text
//! <!-- BEGIN {"slug":"prompts/code-review","category_path":["prompts"],"length":42} -->
//! ...body, exactly `length` bytes...
//! <!-- END prompts/code-review -->
//! ```
//!
//! The header is compact JSON on a single line. `length` lets [`split_export`]
//! cut bodies exactly, even when a body happens to contain marker-like text.

use crate::catalog::{Catalog, ContentKind, ContentNode};
use crate::error::NotFoundError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BEGIN_PREFIX: &str = "<!-- BEGIN ";
const MARKER_SUFFIX: &str = " -->";

/// One row of the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub slug: String,
    pub title: String,
    pub nav_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ContentKind,
    pub category_path: Vec<String>,
}

/// Full view of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentDocument {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ContentKind,
    pub category_path: Vec<String>,
    pub body: String,
    /// Slugs of the references owned by a skill.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl From<&ContentNode> for ContentDocument {
    fn from(node: &ContentNode) -> Self {
        Self {
            slug: node.slug.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            name: node.name.clone(),
            kind: node.kind,
            category_path: node.category_path.clone(),
            body: node.body.clone(),
            references: node.references.iter().map(|r| r.slug.clone()).collect(),
        }
    }
}

/// Every document in navigation order.
pub fn listing(catalog: &Catalog) -> Vec<ListingEntry> {
    catalog
        .walk()
        .into_iter()
        .map(|node| ListingEntry {
            slug: node.slug.clone(),
            title: node.title.clone(),
            nav_title: node.nav_title.clone(),
            description: node.description.clone(),
            kind: node.kind,
            category_path: node.category_path.clone(),
        })
        .collect()
}

/// The listing as pretty-printed JSON.
pub fn listing_json(catalog: &Catalog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&listing(catalog))
}

/// Look up one document by slug.
pub fn get_content(catalog: &Catalog, slug: &str) -> Result<ContentDocument, NotFoundError> {
    catalog
        .get(slug)
        .map(|node| ContentDocument::from(node.as_ref()))
        .ok_or_else(|| NotFoundError::new(slug))
}

/// The verbatim body of one document.
pub fn raw_markdown<'a>(catalog: &'a Catalog, slug: &str) -> Result<&'a str, NotFoundError> {
    catalog
        .get(slug)
        .map(|node| node.body.as_str())
        .ok_or_else(|| NotFoundError::new(slug))
}

#[derive(Serialize, Deserialize)]
struct BlockHeader {
    slug: String,
    category_path: Vec<String>,
    length: usize,
}

/// Concatenate every document body into one splittable text.
pub fn aggregated_export(catalog: &Catalog) -> String {
    let blocks: Vec<String> = catalog.walk().into_iter().map(export_block).collect();
    blocks.join("\n")
}

fn export_block(node: &ContentNode) -> String {
    let header = BlockHeader {
        slug: node.slug.clone(),
        category_path: node.category_path.clone(),
        length: node.body.len(),
    };
    // Serializing a struct of strings cannot fail.
    let header = serde_json::to_string(&header).unwrap_or_default();
    format!(
        "{BEGIN_PREFIX}{header}{MARKER_SUFFIX}\n{body}\n{end}\n",
        body = node.body,
        end = end_marker(&node.slug),
    )
}

fn end_marker(slug: &str) -> String {
    format!("<!-- END {slug}{MARKER_SUFFIX}")
}

/// One document recovered from an aggregated export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub slug: String,
    pub category_path: Vec<String>,
    pub body: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportParseError {
    #[error("expected BEGIN marker at byte {offset}")]
    MissingBegin { offset: usize },
    #[error("malformed BEGIN header at byte {offset}: {message}")]
    MalformedHeader { offset: usize, message: String },
    #[error("body of '{slug}' runs past the end of the export")]
    TruncatedBody { slug: String },
    #[error("missing END marker for '{slug}'")]
    MissingEnd { slug: String },
}

/// Split an aggregated export back into its documents.
pub fn split_export(text: &str) -> Result<Vec<ExportedDocument>, ExportParseError> {
    let mut documents = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        if !documents.is_empty() {
            if !text[pos..].starts_with('\n') {
                return Err(ExportParseError::MissingBegin { offset: pos });
            }
            pos += 1;
        }

        let rest = &text[pos..];
        if !rest.starts_with(BEGIN_PREFIX) {
            return Err(ExportParseError::MissingBegin { offset: pos });
        }
        let line_end = rest
            .find('\n')
            .ok_or_else(|| ExportParseError::MalformedHeader {
                offset: pos,
                message: "header line is not terminated".to_string(),
            })?;
        let json = rest[BEGIN_PREFIX.len()..line_end]
            .strip_suffix(MARKER_SUFFIX)
            .ok_or_else(|| ExportParseError::MalformedHeader {
                offset: pos,
                message: "header line does not end with '-->'".to_string(),
            })?;
        let header: BlockHeader =
            serde_json::from_str(json).map_err(|e| ExportParseError::MalformedHeader {
                offset: pos,
                message: e.to_string(),
            })?;

        let body_start = pos + line_end + 1;
        let body = body_start
            .checked_add(header.length)
            .and_then(|end| text.get(body_start..end))
            .ok_or_else(|| ExportParseError::TruncatedBody {
                slug: header.slug.clone(),
            })?;

        let trailer = format!("\n{}\n", end_marker(&header.slug));
        let after_body = body_start + body.len();
        if !text[after_body..].starts_with(&trailer) {
            return Err(ExportParseError::MissingEnd { slug: header.slug });
        }
        pos = after_body + trailer.len();

        documents.push(ExportedDocument {
            slug: header.slug,
            category_path: header.category_path,
            body: body.to_string(),
        });
    }

    Ok(documents)
}
