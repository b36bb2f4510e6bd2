//! Content tree scanning.
//!
//! Stage 1 of a catalog build. Walks the content root and records what is on
//! disk: directories, content files, and the raw text of any per-directory
//! ordering file. Nothing is interpreted here; frontmatter parsing, ordering,
//! and slug assignment all happen downstream in [`crate::catalog`].
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                  # Catalog configuration (optional)
//! ├── _meta.toml                   # Ordering for the root (optional)
//! ├── getting-started.md           # Prompt
//! ├── prompts/                     # Category
//! │   ├── _meta.toml
//! │   ├── code-review.md
//! │   └── writing/
//! │       └── blog-post.mdx
//! ├── skills/
//! │   └── pdf-tools/               # Skill (contains SKILL.md)
//! │       ├── SKILL.md
//! │       ├── references/
//! │       │   └── forms.md         # Reference owned by the skill
//! │       └── scripts/extract.py   # Not content, skipped
//! └── .drafts/                     # Hidden, skipped
//! ```
//!
//! ## Filtering
//!
//! - Only files whose extension is in `content.extensions` are kept
//! - Symlinks are never followed or recorded
//! - Names starting with `.` or `_`, and names in `content.exclude`, are skipped
//!
//! Entries are listed in byte-wise file name order so two scans of the same
//! tree always agree, whatever order the filesystem enumerates in.

use crate::config::ContentConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("content root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ScanError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A scanned directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanDir {
    /// Directory name; empty for the content root.
    pub name: String,
    /// Path relative to the content root; empty for the root itself.
    pub rel_path: PathBuf,
    /// Raw contents of the ordering file, if this directory has one.
    pub ordering: Option<String>,
    /// Children in file name order.
    pub entries: Vec<ScanEntry>,
}

/// A content file found during the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFile {
    /// File name including extension.
    pub name: String,
    /// File name without extension; the identifier used by ordering files.
    pub stem: String,
    /// Absolute (or root-joined) path used to read the file.
    pub path: PathBuf,
    /// Path relative to the content root.
    pub rel_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEntry {
    Dir(ScanDir),
    File(ScanFile),
}

impl ScanEntry {
    /// Identifier used to reference this entry from an ordering file.
    pub fn identifier(&self) -> &str {
        match self {
            ScanEntry::Dir(d) => &d.name,
            ScanEntry::File(f) => &f.stem,
        }
    }
}

impl ScanDir {
    /// The content file with this exact name directly in this directory.
    pub fn file(&self, name: &str) -> Option<&ScanFile> {
        self.entries.iter().find_map(|entry| match entry {
            ScanEntry::File(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    /// All content files below this directory, depth-first in entry order.
    pub fn files(&self) -> Vec<&ScanFile> {
        let mut files = Vec::new();
        collect_files(self, &mut files);
        files
    }
}

fn collect_files<'a>(dir: &'a ScanDir, out: &mut Vec<&'a ScanFile>) {
    for entry in &dir.entries {
        match entry {
            ScanEntry::Dir(d) => collect_files(d, out),
            ScanEntry::File(f) => out.push(f),
        }
    }
}

/// Scan the content root into a tree of raw entries.
///
/// Fails if the root is missing, not a directory, or unreadable. No catalog
/// can be built without a successful scan.
pub fn scan(root: &Path, content: &ContentConfig) -> Result<ScanDir, ScanError> {
    let meta = match fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        Err(e) => return Err(ScanError::io(root, e)),
    };
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    scan_directory(root, root, String::new(), content)
}

fn scan_directory(
    path: &Path,
    root: &Path,
    name: String,
    content: &ContentConfig,
) -> Result<ScanDir, ScanError> {
    let rel_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();

    let ordering_path = path.join(&content.ordering_file);
    let ordering = if ordering_path.is_file() {
        Some(fs::read_to_string(&ordering_path).map_err(|e| ScanError::io(&ordering_path, e))?)
    } else {
        None
    };

    let mut entries = Vec::new();
    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            debug!(path = %entry.path().display(), "skipping symlink");
            continue;
        }
        if content.is_excluded(&file_name) {
            continue;
        }

        if file_type.is_dir() {
            let child = scan_directory(entry.path(), root, file_name, content)?;
            entries.push(ScanEntry::Dir(child));
        } else if file_type.is_file() && content.is_content_file(&file_name) {
            let stem = Path::new(&file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            entries.push(ScanEntry::File(ScanFile {
                name: file_name,
                stem,
                path: entry.path().to_path_buf(),
                rel_path: rel,
            }));
        }
    }

    Ok(ScanDir {
        name,
        rel_path,
        ordering,
        entries,
    })
}
