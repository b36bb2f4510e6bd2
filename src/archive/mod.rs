//! Skill archives.
//!
//! | Concern | Where |
//! |---|---|
//! | **Manifest** (what goes in, in which order) | [`manifest()`] |
//! | **Packaging** (manifest → bytes) | [`Packager`] trait + [`ZipPackager`] |
//! | **Bundles on disk** (write, digest, verify) | [`write_bundles`], [`verify_bundles`] |
//!
//! The manifest is a pure function of the catalog. Packagers only encode it,
//! so every output format shares the same layout and ordering:
//!
//! ```text
//! pdf-tools.zip                 all-skills.zip
//! ├── SKILL.md                  ├── skills/commit-helper/SKILL.md
//! └── references/               ├── skills/pdf-tools/SKILL.md
//!     ├── api.md                ├── skills/pdf-tools/references/api.md
//!     └── forms.md              └── ...
//! ```

mod bundles;
mod manifest;
pub mod packager;

use crate::error::NotFoundError;
use thiserror::Error;

pub use bundles::{
    BundleCheck, BundleIndex, BundleRecord, BundleStatus, INDEX_FILE, read_index,
    verify_bundles, write_bundles,
};
pub use manifest::{ArchiveManifest, ArchiveTarget, ManifestEntry, manifest};
pub use packager::{Packager, ZipPackager};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("'{slug}' is a {kind}, not a skill")]
    NotASkill { slug: String, kind: &'static str },
    #[error("skill '{skill}' has two documents that map to {path}")]
    DuplicatePath { skill: String, path: String },
    #[error("skill '{0}' has the same name as the all-skills bundle")]
    NameCollision(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("bundle index error: {0}")]
    Index(#[from] serde_json::Error),
}
