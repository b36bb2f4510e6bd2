//! Archive manifests: which files a bundle holds and in what order.

use super::ArchiveError;
use crate::catalog::{Catalog, ContentKind, ContentNode};
use crate::config::SiteConfig;
use crate::error::NotFoundError;
use std::collections::HashSet;
use std::path::{Component, Path};

/// What to bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveTarget<'a> {
    /// A single skill, by slug.
    Skill(&'a str),
    /// Every skill in the catalog.
    All,
}

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// `/`-separated path inside the archive.
    pub path: String,
    /// File contents, the full source including frontmatter.
    pub content: String,
}

/// Ordered archive contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveManifest {
    pub entries: Vec<ManifestEntry>,
}

impl ArchiveManifest {
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the manifest for one skill or for all of them.
///
/// A single skill yields its skill file at the top level followed by each
/// reference under the references directory, in resolved order. [`ArchiveTarget::All`]
/// concatenates every skill's manifest under a `<slug>/` prefix, skills in
/// [`Catalog::walk`] order.
pub fn manifest(
    catalog: &Catalog,
    target: ArchiveTarget<'_>,
    config: &SiteConfig,
) -> Result<ArchiveManifest, ArchiveError> {
    match target {
        ArchiveTarget::Skill(slug) => {
            let node = catalog.get(slug).ok_or_else(|| NotFoundError::new(slug))?;
            skill_manifest(node, config)
        }
        ArchiveTarget::All => {
            let mut entries = Vec::new();
            for skill in catalog.skills() {
                let single = skill_manifest(skill, config)?;
                entries.extend(single.entries.into_iter().map(|e| ManifestEntry {
                    path: format!("{}/{}", skill.slug, e.path),
                    content: e.content,
                }));
            }
            Ok(ArchiveManifest { entries })
        }
    }
}

fn skill_manifest(skill: &ContentNode, config: &SiteConfig) -> Result<ArchiveManifest, ArchiveError> {
    if skill.kind != ContentKind::Skill {
        return Err(ArchiveError::NotASkill {
            slug: skill.slug.clone(),
            kind: skill.kind.as_str(),
        });
    }

    let skill_dir = skill.source_path.parent().unwrap_or(Path::new(""));
    let references_dir = config.archive.references_dir.as_str();

    let mut entries = Vec::with_capacity(skill.references.len() + 1);
    entries.push(ManifestEntry {
        path: config.content.skill_file.clone(),
        content: skill.source.clone(),
    });

    let mut seen = HashSet::new();
    for reference in &skill.references {
        let rel = reference
            .source_path
            .strip_prefix(skill_dir)
            .unwrap_or(&reference.source_path);
        let rel = rel.strip_prefix(references_dir).unwrap_or(rel);
        let path = format!("{references_dir}/{}", archive_path(rel));

        if !seen.insert(path.clone()) {
            return Err(ArchiveError::DuplicatePath {
                skill: skill.slug.clone(),
                path,
            });
        }
        entries.push(ManifestEntry {
            path,
            content: reference.source.clone(),
        });
    }

    Ok(ArchiveManifest { entries })
}

/// Join path components with `/` regardless of platform.
fn archive_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
