//! Frontmatter extraction and metadata decoding.
//!
//! Every content file starts with a YAML header between `---` lines:
//!
//! ```text
//! ---
//! title: Code Review
//! description: Review a diff for correctness and style
//! ---
//! # Code Review
//! ...
//! ```
//!
//! The header is decoded into [`Metadata`] with a strict schema: `title` is
//! required, `description` and `name` are optional, any other keys are
//! reported but tolerated. The body is a slice of the original text starting
//! right after the closing delimiter line, so raw-markdown consumers get the
//! source back byte for byte.

use crate::error::ValidationError;
use serde::Deserialize;
use std::path::Path;

/// Delimiter line for frontmatter sections.
const FRONTMATTER_DELIMITER: &str = "---";

/// Decoded header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub description: Option<String>,
    pub name: Option<String>,
}

/// A content file split into its decoded header and verbatim body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    /// Text after the closing delimiter line, unmodified.
    pub body: String,
    /// Header keys that are not part of the schema.
    pub ignored_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    title: Option<String>,
    description: Option<String>,
    name: Option<String>,
}

/// Header and body slices of a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    /// YAML between the delimiters (without the delimiter lines).
    pub header: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Split a source text into header and body without altering either.
///
/// The opening delimiter must be the first line. Trailing whitespace and a
/// `\r` on delimiter lines are tolerated.
pub fn split_sections<'a>(source: &'a str, path: &Path) -> Result<Sections<'a>, ValidationError> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);
    let offset = source.len() - text.len();

    let (first_line, mut cursor) = match text.find('\n') {
        Some(end) => (&text[..end], end + 1),
        None => (text, text.len()),
    };
    if first_line.trim_end() != FRONTMATTER_DELIMITER {
        return Err(ValidationError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let header_start = cursor;
    while cursor < text.len() {
        let line_end = text[cursor..]
            .find('\n')
            .map(|i| cursor + i)
            .unwrap_or(text.len());
        let line = &text[cursor..line_end];
        if line.trim_end() == FRONTMATTER_DELIMITER {
            let header = text[header_start..cursor]
                .strip_suffix('\n')
                .map(|h| h.strip_suffix('\r').unwrap_or(h))
                .unwrap_or("");
            let body_start = (line_end + 1).min(text.len());
            return Ok(Sections {
                header,
                body: &source[offset + body_start..],
            });
        }
        cursor = line_end + 1;
    }

    Err(ValidationError::UnclosedHeader {
        path: path.to_path_buf(),
    })
}

/// Decode a YAML header into [`Metadata`].
///
/// Returns the metadata plus any keys outside the schema.
pub fn decode_header(yaml: &str, path: &Path) -> Result<(Metadata, Vec<String>), ValidationError> {
    if yaml.trim().is_empty() {
        return Err(ValidationError::MissingTitle {
            path: path.to_path_buf(),
        });
    }

    let mut ignored = Vec::new();
    let deserializer = serde_yaml_ng::Deserializer::from_str(yaml);
    let raw: RawMetadata = serde_ignored::deserialize(deserializer, |key| {
        ignored.push(key.to_string());
    })
    .map_err(|e| ValidationError::MalformedHeader {
        path: path.to_path_buf(),
        message: format_yaml_error(yaml, &e),
    })?;

    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ValidationError::MissingTitle {
            path: path.to_path_buf(),
        })?;

    Ok((
        Metadata {
            title,
            description: non_blank(raw.description),
            name: non_blank(raw.name),
        },
        ignored,
    ))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split and decode one content file.
pub fn parse_document(source: &str, path: &Path) -> Result<ParsedDocument, ValidationError> {
    let sections = split_sections(source, path)?;
    let (metadata, ignored_keys) = decode_header(sections.header, path)?;
    Ok(ParsedDocument {
        metadata,
        body: sections.body.to_string(),
        ignored_keys,
    })
}

/// Decode raw file bytes, rejecting anything that is not UTF-8.
pub fn decode_utf8(bytes: Vec<u8>, path: &Path) -> Result<String, ValidationError> {
    String::from_utf8(bytes).map_err(|_| ValidationError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}

fn format_yaml_error(yaml: &str, err: &serde_yaml_ng::Error) -> String {
    let mut message = String::new();
    let err_str = err.to_string();

    // The header starts on line 2 of the file.
    match err.location() {
        Some(loc) => message.push_str(&format!("Line {}: Invalid YAML - {}", loc.line() + 1, err_str)),
        None => message.push_str(&format!("Invalid YAML - {}", err_str)),
    }

    if should_hint_colon_quotes(yaml, &err_str) {
        message.push_str("\nHint: Strings with colons need quotes: title: \"Review: Security\"");
    }
    message
}

fn should_hint_colon_quotes(yaml: &str, err_str: &str) -> bool {
    err_str.contains("mapping values are not allowed")
        || yaml
            .lines()
            .filter_map(|l| l.split_once(": "))
            .any(|(_, value)| value.contains(": ") && !value.trim_start().starts_with(['"', '\'']))
}
