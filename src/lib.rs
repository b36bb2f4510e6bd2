//! # Prompt Catalog
//!
//! Content discovery and catalog assembly for a library of reusable AI prompt
//! and skill documents. Your filesystem is the data source: directories
//! become categories, markdown files with frontmatter become prompts, and a
//! directory holding a `SKILL.md` becomes a downloadable skill.
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! 1. Scan        content/      →  ScanDir       (filesystem facts only)
//! 2. Parse       each file     →  Metadata      (frontmatter, in parallel)
//! 3. Order       each dir      →  child order   (ordering file vs. disk)
//! 4. Assemble    all of above  →  Catalog       (tree + slug index)
//! 5. Project     Catalog       →  listing, documents, export, archives
//! ```
//!
//! Nothing downstream of the catalog reads the filesystem. Every consumer
//! works on the same immutable [`catalog::Catalog`], which is what keeps the
//! JSON listing, the aggregated export, and the skill archives consistent
//! with one another.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content root into a raw tree of directories and content files |
//! | [`frontmatter`] | Splits header from body and decodes `title`/`description`/`name` |
//! | [`ordering`] | Per-directory `_meta.toml` parsing and child ordering |
//! | [`naming`] | Slug derivation and identifier → display title |
//! | [`catalog`] | Assembles the catalog, enforcing slug uniqueness and tree/index closure |
//! | [`views`] | Listing, single-document lookup, aggregated export and its splitter |
//! | [`archive`] | Skill archive manifests, zip packaging, bundle writing and verification |
//! | [`store`] | Atomically published catalog with coalesced rebuilds |
//! | [`watch`] | Rebuilds the store when content changes |
//! | [`config`] | `config.toml` loading, validation, and stock defaults |
//! | [`error`] | Build and lookup error taxonomy |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fail Closed
//!
//! A build either produces a fully consistent catalog or an error naming the
//! offending files. Missing titles, malformed headers, ordering entries that
//! name nothing on disk, and colliding slugs all reject the whole pass. The
//! [`store::CatalogStore`] keeps serving the last good catalog when a rebuild
//! fails and refuses to open when the first build fails.
//!
//! ## Slugs From Paths
//!
//! Slugs come from the relative path alone, never from file contents, so
//! editing a document cannot break a link to it. See [`naming::slug_for_path`].
//!
//! ## Ordering Files Over Prefixes
//!
//! Display order comes from an optional per-directory ordering file. Children
//! it does not mention are appended in file name order, so new content shows
//! up without touching configuration.

pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod naming;
pub mod ordering;
pub mod output;
pub mod scan;
pub mod store;
pub mod views;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
