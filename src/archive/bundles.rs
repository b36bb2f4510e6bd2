//! Pre-built bundles on disk.
//!
//! [`write_bundles`] packages every skill plus the all-skills bundle into an
//! output directory and records their SHA-256 digests in `bundles.json`.
//! [`verify_bundles`] recomputes the expected bytes from the current catalog
//! and reports files that are missing or no longer match. Bundles listed in
//! the previous index but no longer produced by the catalog are orphans:
//! rewriting removes them and verification reports them.
//!
//! ```text
//! dist/
//! ├── bundles.json
//! ├── all-skills.zip
//! └── skills/
//!     ├── commit-helper.zip
//!     └── pdf-tools.zip
//! ```

use super::{ArchiveError, ArchiveTarget, Packager, manifest};
use crate::catalog::Catalog;
use crate::config::SiteConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fs;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the digest index written next to the bundles.
pub const INDEX_FILE: &str = "bundles.json";

/// One packaged bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRecord {
    /// Skill slug, or the all-skills bundle name.
    pub name: String,
    /// Path of the archive relative to the output directory.
    pub file: String,
    pub sha256: String,
    /// Number of files inside the archive.
    pub entries: usize,
}

/// Contents of `bundles.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleIndex {
    pub bundles: Vec<BundleRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleStatus {
    Current,
    Missing,
    Stale,
    /// Listed in the previous index but no longer produced by the catalog.
    Orphaned,
}

/// Verification result for one expected bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCheck {
    pub file: String,
    pub status: BundleStatus,
}

struct PlannedBundle {
    record: BundleRecord,
    bytes: Vec<u8>,
}

fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Package every bundle in memory, per-skill bundles first in walk order.
fn plan(
    catalog: &Catalog,
    config: &SiteConfig,
    packager: &dyn Packager,
) -> Result<Vec<PlannedBundle>, ArchiveError> {
    let all_name = config.archive.all_bundle_name.as_str();
    let skills = catalog.skills();
    if let Some(clash) = skills.iter().find(|s| s.slug == all_name) {
        return Err(ArchiveError::NameCollision(clash.slug.clone()));
    }

    let mut names: Vec<(String, ArchiveTarget<'_>)> = skills
        .iter()
        .map(|s| (s.slug.clone(), ArchiveTarget::Skill(s.slug.as_str())))
        .collect();
    names.push((all_name.to_string(), ArchiveTarget::All));

    names
        .par_iter()
        .map(|(name, target)| -> Result<PlannedBundle, ArchiveError> {
            let manifest = manifest(catalog, *target, config)?;
            let bytes = packager.package(&manifest)?;
            Ok(PlannedBundle {
                record: BundleRecord {
                    name: name.clone(),
                    file: format!("{name}.{}", packager.extension()),
                    sha256: digest_hex(&bytes),
                    entries: manifest.entries.len(),
                },
                bytes,
            })
        })
        .collect()
}

/// Previously written archives that the current plan no longer produces.
///
/// Index entries that point outside `output_dir` are ignored.
fn orphans(planned: &[PlannedBundle], output_dir: &Path) -> Result<Vec<String>, ArchiveError> {
    if !output_dir.join(INDEX_FILE).is_file() {
        return Ok(Vec::new());
    }
    let previous = read_index(output_dir)?;
    let current: HashSet<&str> = planned.iter().map(|b| b.record.file.as_str()).collect();

    Ok(previous
        .bundles
        .into_iter()
        .map(|record| record.file)
        .filter(|file| !current.contains(file.as_str()))
        .filter(|file| {
            let inside = Path::new(file)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
            if !inside {
                warn!(file = %file, "ignoring index entry outside the output directory");
            }
            inside
        })
        .collect())
}

/// Write every bundle and the digest index into `output_dir`.
///
/// Archives listed in the previous index that the catalog no longer
/// produces are deleted.
pub fn write_bundles(
    catalog: &Catalog,
    config: &SiteConfig,
    packager: &dyn Packager,
    output_dir: &Path,
) -> Result<BundleIndex, ArchiveError> {
    let planned = plan(catalog, config, packager)?;
    let stale = orphans(&planned, output_dir)?;
    fs::create_dir_all(output_dir)?;

    for file in &stale {
        match fs::remove_file(output_dir.join(file)) {
            Ok(()) => info!(file = %file, "removed orphaned bundle"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    let mut index = BundleIndex::default();
    for bundle in planned {
        let path = output_dir.join(&bundle.record.file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &bundle.bytes)?;
        debug!(file = %bundle.record.file, entries = bundle.record.entries, "wrote bundle");
        index.bundles.push(bundle.record);
    }

    let json = serde_json::to_string_pretty(&index)?;
    fs::write(output_dir.join(INDEX_FILE), json)?;
    info!(
        bundles = index.bundles.len(),
        dir = %output_dir.display(),
        "bundles written"
    );
    Ok(index)
}

/// Compare bundles on disk against what the catalog would produce now.
pub fn verify_bundles(
    catalog: &Catalog,
    config: &SiteConfig,
    packager: &dyn Packager,
    output_dir: &Path,
) -> Result<Vec<BundleCheck>, ArchiveError> {
    let planned = plan(catalog, config, packager)?;
    let stale = orphans(&planned, output_dir)?;
    let mut checks = Vec::with_capacity(planned.len() + stale.len());
    for bundle in planned {
        let path: PathBuf = output_dir.join(&bundle.record.file);
        let status = match fs::read(&path) {
            Ok(bytes) if digest_hex(&bytes) == bundle.record.sha256 => BundleStatus::Current,
            Ok(_) => BundleStatus::Stale,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BundleStatus::Missing,
            Err(e) => return Err(e.into()),
        };
        checks.push(BundleCheck {
            file: bundle.record.file,
            status,
        });
    }
    checks.extend(
        stale
            .into_iter()
            .filter(|file| output_dir.join(file).exists())
            .map(|file| BundleCheck {
                file,
                status: BundleStatus::Orphaned,
            }),
    );
    Ok(checks)
}

/// Read a previously written `bundles.json`.
pub fn read_index(output_dir: &Path) -> Result<BundleIndex, ArchiveError> {
    let text = fs::read_to_string(output_dir.join(INDEX_FILE))?;
    Ok(serde_json::from_str(&text)?)
}
