//! Catalog assembly.
//!
//! Stage 2 of a build. Combines the scan tree, the parsed frontmatter of every
//! content file, and each directory's resolved ordering into an immutable
//! [`Catalog`]: a navigation tree plus a slug index over the same nodes.
//!
//! ## Node kinds
//!
//! - **Prompt**: any content file outside a skill directory
//! - **Skill**: a directory holding the skill file (`SKILL.md` by default);
//!   the node's body is that file
//! - **Reference**: any other content file below a skill directory, owned by
//!   the skill and flattened in resolved order
//!
//! ## Invariants
//!
//! Both are enforced while the tree is assembled, so a build either yields a
//! consistent catalog or fails as a whole:
//!
//! - No two source files share a slug ([`DuplicateSlugError`])
//! - Every node reachable from the tree is in the index and vice versa; both
//!   are filled by the same insertion in [`Builder::leaf`]
//!
//! ## Parallelism
//!
//! Reading and parsing content files is independent per file and runs on the
//! rayon pool. Assembly, where slugs are checked, is sequential.

use crate::config::SiteConfig;
use crate::error::{BuildError, DuplicateSlugError, ValidationError};
use crate::frontmatter::{self, ParsedDocument};
use crate::naming;
use crate::ordering::{self, OrderingConfig};
use crate::scan::{self, ScanDir, ScanEntry, ScanError, ScanFile};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Discriminates what a content node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Prompt,
    Skill,
    Reference,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Prompt => "prompt",
            ContentKind::Skill => "skill",
            ContentKind::Reference => "reference",
        }
    }
}

/// A single content document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    /// Path-derived identifier, unique across the catalog.
    pub slug: String,
    /// Directory identifiers from the content root down to this node's parent.
    pub category_path: Vec<String>,
    pub title: String,
    /// Navigation label: the ordering file's title override, else `title`.
    pub nav_title: String,
    pub description: Option<String>,
    pub name: Option<String>,
    pub kind: ContentKind,
    /// Text after the frontmatter, verbatim.
    pub body: String,
    /// Whole file, verbatim.
    pub source: String,
    /// Source file relative to the content root.
    pub source_path: PathBuf,
    /// Reference documents owned by a skill, in resolved order. Empty for
    /// prompts and references.
    pub references: Vec<Arc<ContentNode>>,
}

/// A directory grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    /// Directory name; empty for the root.
    pub identifier: String,
    pub title: String,
    pub children: Vec<Node>,
}

impl CategoryNode {
    fn empty_root() -> Self {
        Self {
            identifier: String::new(),
            title: String::new(),
            children: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Category(CategoryNode),
    Content(Arc<ContentNode>),
}

/// The immutable, fully validated content library.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    root: CategoryNode,
    index: HashMap<String, Arc<ContentNode>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl Catalog {
    /// A catalog with no content.
    pub fn empty() -> Self {
        Self {
            root: CategoryNode::empty_root(),
            index: HashMap::new(),
        }
    }

    /// Root of the navigation tree.
    pub fn root(&self) -> &CategoryNode {
        &self.root
    }

    pub fn get(&self, slug: &str) -> Option<&Arc<ContentNode>> {
        self.index.get(slug)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Indexed slugs, in no particular order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Every content node in navigation pre-order.
    ///
    /// A skill is followed immediately by its references. This is the single
    /// traversal behind the listing, the aggregated export, and the archive
    /// manifests, so all of them agree on order.
    pub fn walk(&self) -> Vec<&ContentNode> {
        let mut out = Vec::with_capacity(self.index.len());
        walk_category(&self.root, &mut out);
        out
    }

    /// Skill nodes in navigation pre-order.
    pub fn skills(&self) -> Vec<&ContentNode> {
        self.walk()
            .into_iter()
            .filter(|n| n.kind == ContentKind::Skill)
            .collect()
    }
}

fn walk_category<'a>(category: &'a CategoryNode, out: &mut Vec<&'a ContentNode>) {
    for child in &category.children {
        match child {
            Node::Category(c) => walk_category(c, out),
            Node::Content(node) => {
                out.push(node);
                out.extend(node.references.iter().map(|r| r.as_ref()));
            }
        }
    }
}

/// Scan the content root and build a catalog from it.
pub fn build(root: &Path, config: &SiteConfig) -> Result<Catalog, BuildError> {
    info!(root = %root.display(), "building catalog");
    let tree = scan::scan(root, &config.content)?;
    let catalog = build_from_scan(&tree, config)?;
    info!(
        documents = catalog.len(),
        skills = catalog.skills().len(),
        "catalog built"
    );
    Ok(catalog)
}

/// Build a catalog from an existing scan tree.
pub fn build_from_scan(tree: &ScanDir, config: &SiteConfig) -> Result<Catalog, BuildError> {
    let docs = parse_all(tree)?;
    let mut builder = Builder {
        config,
        docs,
        index: HashMap::new(),
    };
    let root = builder.category(tree, String::new(), &[])?;
    Ok(Catalog {
        root,
        index: builder.index,
    })
}

struct SourceDoc {
    parsed: ParsedDocument,
    source: String,
}

/// Read and parse every content file in parallel.
///
/// Results are collected in scan order before the first error is taken, so
/// a broken tree always reports the same file.
fn parse_all(tree: &ScanDir) -> Result<HashMap<PathBuf, SourceDoc>, BuildError> {
    let files = tree.files();
    let results: Vec<Result<(PathBuf, SourceDoc), BuildError>> = files
        .par_iter()
        .map(|file| read_document(file).map(|doc| (file.rel_path.clone(), doc)))
        .collect();

    let mut docs = HashMap::with_capacity(results.len());
    for result in results {
        let (path, doc) = result?;
        docs.insert(path, doc);
    }
    Ok(docs)
}

fn read_document(file: &ScanFile) -> Result<SourceDoc, BuildError> {
    let bytes = fs::read(&file.path).map_err(|e| ScanError::io(&file.path, e))?;
    let source = frontmatter::decode_utf8(bytes, &file.rel_path)?;
    let parsed = frontmatter::parse_document(&source, &file.rel_path)?;
    if !parsed.ignored_keys.is_empty() {
        debug!(
            path = %file.rel_path.display(),
            keys = ?parsed.ignored_keys,
            "ignoring unknown frontmatter keys"
        );
    }
    Ok(SourceDoc { parsed, source })
}

struct Builder<'a> {
    config: &'a SiteConfig,
    docs: HashMap<PathBuf, SourceDoc>,
    index: HashMap<String, Arc<ContentNode>>,
}

impl<'a> Builder<'a> {
    fn category(
        &mut self,
        dir: &ScanDir,
        title: String,
        ancestors: &[String],
    ) -> Result<CategoryNode, BuildError> {
        let config = self.config;
        let mut path = ancestors.to_vec();
        if !dir.name.is_empty() {
            path.push(dir.name.clone());
        }

        let mut children = Vec::new();
        for (entry, title_override) in self.ordered_entries(dir, None)? {
            match entry {
                ScanEntry::Dir(sub) => match sub.file(&config.content.skill_file) {
                    Some(file) => {
                        let node = self.skill(sub, file, title_override, &path)?;
                        children.push(Node::Content(node));
                    }
                    None => {
                        let title =
                            title_override.unwrap_or_else(|| naming::display_title(&sub.name));
                        let child = self.category(sub, title, &path)?;
                        if child.is_empty() {
                            debug!(dir = %sub.rel_path.display(), "pruning category without content");
                        } else {
                            children.push(Node::Category(child));
                        }
                    }
                },
                ScanEntry::File(file) => {
                    let node = self.leaf(
                        file,
                        ContentKind::Prompt,
                        None,
                        title_override,
                        &path,
                        Vec::new(),
                    )?;
                    children.push(Node::Content(node));
                }
            }
        }

        Ok(CategoryNode {
            identifier: dir.name.clone(),
            title,
            children,
        })
    }

    fn skill(
        &mut self,
        dir: &ScanDir,
        file: &ScanFile,
        title_override: Option<String>,
        ancestors: &[String],
    ) -> Result<Arc<ContentNode>, BuildError> {
        let slug = naming::slug_for_path(&dir.rel_path, false).ok_or_else(|| {
            ValidationError::InvalidSlug {
                path: dir.rel_path.clone(),
            }
        })?;

        let mut path = ancestors.to_vec();
        path.push(dir.name.clone());

        let mut references = Vec::new();
        self.references(dir, Some(&file.name), &path, &mut references)?;
        debug!(slug = %slug, references = references.len(), "assembled skill");

        self.leaf(
            file,
            ContentKind::Skill,
            Some(slug),
            title_override,
            ancestors,
            references,
        )
    }

    /// Collect a skill directory's documents, flattening sub-directories.
    fn references(
        &mut self,
        dir: &ScanDir,
        skip_file: Option<&str>,
        path: &[String],
        out: &mut Vec<Arc<ContentNode>>,
    ) -> Result<(), BuildError> {
        for (entry, title_override) in self.ordered_entries(dir, skip_file)? {
            match entry {
                ScanEntry::Dir(sub) => {
                    let mut sub_path = path.to_vec();
                    sub_path.push(sub.name.clone());
                    self.references(sub, None, &sub_path, out)?;
                }
                ScanEntry::File(file) => {
                    let node = self.leaf(
                        file,
                        ContentKind::Reference,
                        None,
                        title_override,
                        path,
                        Vec::new(),
                    )?;
                    out.push(node);
                }
            }
        }
        Ok(())
    }

    /// Apply the directory's ordering file to its entries.
    fn ordered_entries<'d>(
        &self,
        dir: &'d ScanDir,
        skip_file: Option<&str>,
    ) -> Result<Vec<(&'d ScanEntry, Option<String>)>, ValidationError> {
        let ordering = dir
            .ordering
            .as_deref()
            .map(|text| {
                let path = dir.rel_path.join(&self.config.content.ordering_file);
                OrderingConfig::parse(text, &path)
            })
            .transpose()?;

        // An ordering file may name the skill file; it is still not a child.
        let identifiers: Vec<&str> = dir.entries.iter().map(|e| e.identifier()).collect();
        let resolved = ordering::resolve(ordering.as_ref(), &identifiers, &dir.rel_path)?;

        Ok(resolved
            .into_iter()
            .map(|r| (&dir.entries[r.index], r.title_override))
            .filter(|(entry, _)| match (entry, skip_file) {
                (ScanEntry::File(f), Some(skip)) => f.name != skip,
                _ => true,
            })
            .collect())
    }

    /// Create a content node and register it in the index.
    fn leaf(
        &mut self,
        file: &ScanFile,
        kind: ContentKind,
        slug: Option<String>,
        title_override: Option<String>,
        category_path: &[String],
        references: Vec<Arc<ContentNode>>,
    ) -> Result<Arc<ContentNode>, BuildError> {
        let slug = match slug {
            Some(slug) => slug,
            None => naming::slug_for_path(&file.rel_path, true).ok_or_else(|| {
                ValidationError::InvalidSlug {
                    path: file.rel_path.clone(),
                }
            })?,
        };

        if let Some(existing) = self.index.get(&slug) {
            return Err(DuplicateSlugError {
                slug,
                first: existing.source_path.clone(),
                second: file.rel_path.clone(),
            }
            .into());
        }

        let doc = self.docs.remove(&file.rel_path).ok_or_else(|| {
            ScanError::io(
                &file.path,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file was not parsed in this build pass",
                ),
            )
        })?;
        let metadata = doc.parsed.metadata;

        let node = Arc::new(ContentNode {
            slug: slug.clone(),
            category_path: category_path.to_vec(),
            nav_title: title_override.unwrap_or_else(|| metadata.title.clone()),
            title: metadata.title,
            description: metadata.description,
            name: metadata.name,
            kind,
            body: doc.parsed.body,
            source: doc.source,
            source_path: file.rel_path.clone(),
            references,
        });
        self.index.insert(slug, Arc::clone(&node));
        Ok(node)
    }
}
