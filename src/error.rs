//! Error taxonomy for catalog builds and lookups.
//!
//! Build-time errors ([`ScanError`], [`ValidationError`], [`DuplicateSlugError`])
//! abort a whole build pass; nothing partial is ever published. [`NotFoundError`]
//! is per-request and never affects the catalog.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::archive::ArchiveError;
pub use crate::scan::ScanError;
pub use crate::views::ExportParseError;

/// Content that cannot be admitted into a catalog.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("no frontmatter found in {path} - file must start with '---'")]
    MissingHeader { path: PathBuf },

    #[error("unclosed frontmatter in {path} - missing closing '---'")]
    UnclosedHeader { path: PathBuf },

    #[error("invalid frontmatter in {path}: {message}")]
    MalformedHeader { path: PathBuf, message: String },

    #[error("missing required field 'title' in {path}")]
    MissingTitle { path: PathBuf },

    #[error("{path} is not valid UTF-8")]
    InvalidEncoding { path: PathBuf },

    #[error("invalid ordering file {path}: {message}")]
    MalformedOrdering { path: PathBuf, message: String },

    #[error("ordering file in {dir} lists '{entry}' but no such entry exists")]
    UnknownOrderingEntry { dir: PathBuf, entry: String },

    #[error("ordering file in {dir} lists '{entry}' more than once")]
    DuplicateOrderingEntry { dir: PathBuf, entry: String },

    #[error("cannot derive a slug from {path}")]
    InvalidSlug { path: PathBuf },
}

/// Two different source files map to the same slug.
#[derive(Error, Debug)]
#[error("duplicate slug '{slug}': {first} and {second}")]
pub struct DuplicateSlugError {
    pub slug: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Any failure that rejects a build pass.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DuplicateSlug(#[from] DuplicateSlugError),
}

/// Lookup of a slug the catalog does not contain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no content with slug '{slug}'")]
pub struct NotFoundError {
    pub slug: String,
}

impl NotFoundError {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_slug_names_both_sources() {
        let err = DuplicateSlugError {
            slug: "prompts/guide".to_string(),
            first: PathBuf::from("prompts/Guide.md"),
            second: PathBuf::from("prompts/guide.mdx"),
        };
        assert_eq!(
            err.to_string(),
            "duplicate slug 'prompts/guide': prompts/Guide.md and prompts/guide.mdx"
        );
    }

    #[test]
    fn build_error_is_transparent() {
        let err: BuildError = ValidationError::MissingTitle {
            path: PathBuf::from("prompts/x.md"),
        }
        .into();
        assert_eq!(err.to_string(), "missing required field 'title' in prompts/x.md");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            NotFoundError::new("nope").to_string(),
            "no content with slug 'nope'"
        );
    }
}
