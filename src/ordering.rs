//! Per-directory ordering.
//!
//! A directory may carry an ordering file (default `_meta.toml`) that lists
//! its children in display order and optionally overrides their titles:
//!
//! ```toml
//! entries = [
//!     "getting-started",
//!     { id = "advanced", title = "Advanced Topics" },
//! ]
//! ```
//!
//! Identifiers are directory names for directories and file stems for files.
//! [`resolve`] emits the declared entries first, then every child the file
//! does not mention in scan order. Nothing on disk is ever dropped, and an
//! entry naming a child that does not exist fails the build.
//!
//! Resolution is a pure function of the ordering config and a list of child
//! identifiers, so it can be tested without touching a filesystem.

use crate::error::ValidationError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One declared ordering entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingEntry {
    pub identifier: String,
    pub title_override: Option<String>,
}

/// Parsed ordering file for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingConfig {
    pub entries: Vec<OrderingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOrdering {
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl OrderingConfig {
    /// Parse the raw text of an ordering file.
    ///
    /// `path` is only used for error reporting.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ValidationError> {
        let raw: RawOrdering =
            toml::from_str(text).map_err(|e| ValidationError::MalformedOrdering {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?;

        let entries = raw
            .entries
            .into_iter()
            .map(|entry| match entry {
                RawEntry::Id(id) => OrderingEntry {
                    identifier: id,
                    title_override: None,
                },
                RawEntry::Detailed { id, title } => OrderingEntry {
                    identifier: id,
                    title_override: title
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty()),
                },
            })
            .collect();

        Ok(Self { entries })
    }
}

/// A child in its final position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Index into the child list passed to [`resolve`].
    pub index: usize,
    pub title_override: Option<String>,
}

/// Order a directory's children.
///
/// `children` are the identifiers of the directory's entries in scan order.
/// Declared entries come first, in declaration order; if one identifier
/// matches several children (e.g. `guide.md` and `guide/`), all of them are
/// emitted in scan order. Undeclared children follow in scan order.
///
/// `dir` is only used for error reporting.
pub fn resolve(
    config: Option<&OrderingConfig>,
    children: &[&str],
    dir: &Path,
) -> Result<Vec<Resolved>, ValidationError> {
    let Some(config) = config else {
        return Ok((0..children.len())
            .map(|index| Resolved {
                index,
                title_override: None,
            })
            .collect());
    };

    let mut placed = vec![false; children.len()];
    let mut declared: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(children.len());

    for entry in &config.entries {
        if !declared.insert(entry.identifier.as_str()) {
            return Err(ValidationError::DuplicateOrderingEntry {
                dir: dir_for_errors(dir),
                entry: entry.identifier.clone(),
            });
        }

        let matches: Vec<usize> = children
            .iter()
            .enumerate()
            .filter(|(_, id)| **id == entry.identifier)
            .map(|(i, _)| i)
            .collect();

        if matches.is_empty() {
            return Err(ValidationError::UnknownOrderingEntry {
                dir: dir_for_errors(dir),
                entry: entry.identifier.clone(),
            });
        }

        for index in matches {
            placed[index] = true;
            order.push(Resolved {
                index,
                title_override: entry.title_override.clone(),
            });
        }
    }

    order.extend(
        placed
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(index, _)| Resolved {
                index,
                title_override: None,
            }),
    );

    Ok(order)
}

fn dir_for_errors(dir: &Path) -> PathBuf {
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir.to_path_buf()
    }
}
