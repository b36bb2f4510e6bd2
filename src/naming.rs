//! Identifier parsing shared by every catalog entry type.
//!
//! Two things are derived from names on disk and nothing else:
//!
//! - **Slugs**: the stable public identifier of a content node. Each relative
//!   path segment is normalized with [`slug_segment`] and the segments are
//!   joined with `/`. Slugs never depend on file contents, so editing a
//!   document cannot break a link to it.
//! - **Display titles**: the fallback label for a category directory when no
//!   ordering file overrides it. See [`display_title`].
//!
//! ## Display Titles
//!
//! An optional numeric `NNN-` prefix is dropped, dashes and underscores become
//! spaces, and each word is capitalized:
//! - `010-code-review` → "Code Review"
//! - `writing_prompts` → "Writing Prompts"
//! - `prompts` → "Prompts"

use std::path::Path;

/// Drop an optional `NNN-` ordering prefix from an entry name.
///
/// - `"020-code-review"` → `"code-review"`
/// - `"001"` → `""`
/// - `"prompts"` → `"prompts"`
pub fn strip_number_prefix(name: &str) -> &str {
    if let Some((prefix, rest)) = name.split_once('-')
        && prefix.parse::<u32>().is_ok()
    {
        return rest;
    }
    if name.parse::<u32>().is_ok() {
        return "";
    }
    name
}

/// Human-readable title for a directory identifier.
///
/// Falls back to the raw identifier when nothing is left after stripping the
/// number prefix (`"001"` stays `"001"`).
pub fn display_title(identifier: &str) -> String {
    let stripped = strip_number_prefix(identifier);
    let base = if stripped.is_empty() {
        identifier
    } else {
        stripped
    };

    let words: Vec<String> = base
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(capitalize_first)
        .collect();

    if words.is_empty() {
        identifier.to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize one path segment for use in a slug.
///
/// - Lower-cases ASCII letters
/// - Replaces anything outside `[a-z0-9._-]` with a dash
/// - Collapses consecutive dashes and strips leading/trailing dashes
///
/// Returns an empty string when nothing usable remains; callers treat that
/// as a validation failure.
pub fn slug_segment(segment: &str) -> String {
    let mapped: String = segment
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(mapped.len());
    let mut prev_dash = false;
    for c in mapped.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    collapsed.trim_matches('-').to_string()
}

/// Derive a slug from a path relative to the content root.
///
/// The final component's extension is dropped when `strip_extension` is set
/// (content files); directory paths (skills) are used as-is.
/// Returns `None` when any segment normalizes to nothing.
pub fn slug_for_path(rel: &Path, strip_extension: bool) -> Option<String> {
    let components: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if components.is_empty() {
        return None;
    }

    let last = components.len() - 1;
    let mut segments = Vec::with_capacity(components.len());
    for (i, raw) in components.iter().enumerate() {
        let raw = if i == last && strip_extension {
            Path::new(raw)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        } else {
            raw.clone()
        };
        let segment = slug_segment(&raw);
        if segment.is_empty() {
            return None;
        }
        segments.push(segment);
    }
    Some(segments.join("/"))
}
