//! Catalog configuration.
//!
//! Handles loading, validating, and merging the optional `config.toml` at the
//! content root. Stock defaults are the base layer; the user file only needs
//! the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [content]
//! extensions = ["md", "mdx"]   # Content file extensions (case-insensitive)
//! exclude = ["node_modules"]   # Extra names to skip (dot/underscore names always skipped)
//! ordering_file = "_meta.toml" # Per-directory ordering file
//! skill_file = "SKILL.md"      # Marks a directory as a skill
//!
//! [archive]
//! references_dir = "references"  # Sub-path for a skill's reference documents
//! all_bundle_name = "all-skills" # File stem of the bundle holding every skill
//! compression = "deflated"       # "deflated" or "stored"
//!
//! [processing]
//! max_processes = 4            # Max parallel parse workers (omit for auto = CPU cores)
//!
//! [watch]
//! debounce_ms = 200            # Quiet period before a rebuild
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the configuration file inside the content root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Catalog configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// What counts as content and how directories are interpreted.
    pub content: ContentConfig,
    /// Archive layout and packaging.
    pub archive: ArchiveConfig,
    /// Parallel parsing settings.
    pub processing: ProcessingConfig,
    /// Watch mode settings.
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        if self
            .content
            .extensions
            .iter()
            .any(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(
                "content.extensions entries must be bare extensions like \"md\"".into(),
            ));
        }
        if !is_plain_file_name(&self.content.ordering_file) {
            return Err(ConfigError::Validation(
                "content.ordering_file must be a plain file name".into(),
            ));
        }
        if !is_plain_file_name(&self.content.skill_file) {
            return Err(ConfigError::Validation(
                "content.skill_file must be a plain file name".into(),
            ));
        }
        if !self.content.is_content_file(&self.content.skill_file) {
            return Err(ConfigError::Validation(
                "content.skill_file must use one of content.extensions".into(),
            ));
        }
        if !is_plain_file_name(&self.archive.references_dir) {
            return Err(ConfigError::Validation(
                "archive.references_dir must be a single path component".into(),
            ));
        }
        if !is_plain_file_name(&self.archive.all_bundle_name) {
            return Err(ConfigError::Validation(
                "archive.all_bundle_name must be a plain file name".into(),
            ));
        }
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.debounce_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Content discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// File extensions treated as content, without the leading dot.
    pub extensions: Vec<String>,
    /// Additional file or directory names to skip anywhere in the tree.
    pub exclude: Vec<String>,
    /// Name of the per-directory ordering file.
    pub ordering_file: String,
    /// Name of the file that turns a directory into a skill.
    pub skill_file: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "mdx".to_string()],
            exclude: vec!["node_modules".to_string()],
            ordering_file: "_meta.toml".to_string(),
            skill_file: "SKILL.md".to_string(),
        }
    }
}

impl ContentConfig {
    /// Whether a file name has one of the allowlisted extensions.
    pub fn is_content_file(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// Whether a name is hidden, system, or explicitly excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        name.starts_with('.') || name.starts_with('_') || self.exclude.iter().any(|e| e == name)
    }
}

/// Compression used when packaging archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

/// Archive layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Sub-directory inside a skill archive that holds reference documents.
    pub references_dir: String,
    /// File stem of the bundle containing every skill.
    pub all_bundle_name: String,
    /// Packaging compression.
    pub compression: Compression,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            references_dir: "references".to_string(),
            all_bundle_name: "all-skills".to_string(),
            compression: Compression::Deflated,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel parse workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Watch mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Milliseconds without filesystem events before a rebuild starts.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# prompt-catalog configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file at the content root.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content discovery
# ---------------------------------------------------------------------------
[content]
# File extensions treated as content documents (case-insensitive).
extensions = ["md", "mdx"]

# Extra file or directory names to skip. Names starting with "." or "_"
# are always skipped.
exclude = ["node_modules"]

# Per-directory ordering file, e.g.
#   entries = ["intro", { id = "advanced", title = "Advanced Topics" }]
ordering_file = "_meta.toml"

# A directory containing this file is a skill; other documents below it
# become the skill's references.
skill_file = "SKILL.md"

# ---------------------------------------------------------------------------
# Archives
# ---------------------------------------------------------------------------
[archive]
# Sub-directory inside a skill archive that holds reference documents.
references_dir = "references"

# File stem of the bundle that holds every skill.
all_bundle_name = "all-skills"

# "deflated" or "stored".
compression = "deflated"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel parse workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Watch mode
# ---------------------------------------------------------------------------
[watch]
# Quiet period in milliseconds before a rebuild starts.
debounce_ms = 200
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.content.extensions, vec!["md", "mdx"]);
        assert_eq!(config.content.ordering_file, "_meta.toml");
        assert_eq!(config.content.skill_file, "SKILL.md");
        assert_eq!(config.archive.references_dir, "references");
        assert_eq!(config.archive.compression, Compression::Deflated);
        assert_eq!(config.watch.debounce_ms, 200);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[archive]
compression = "stored"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.archive.compression, Compression::Stored);
        assert_eq!(config.archive.all_bundle_name, "all-skills");
        assert_eq!(config.content.skill_file, "SKILL.md");
    }

    #[test]
    fn content_file_extension_is_case_insensitive() {
        let content = ContentConfig::default();
        assert!(content.is_content_file("guide.md"));
        assert!(content.is_content_file("Guide.MDX"));
        assert!(!content.is_content_file("logo.png"));
        assert!(!content.is_content_file("README"));
    }

    #[test]
    fn hidden_and_excluded_names() {
        let content = ContentConfig::default();
        assert!(content.is_excluded(".git"));
        assert!(content.is_excluded("_drafts"));
        assert!(content.is_excluded("node_modules"));
        assert!(!content.is_excluded("prompts"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[content]
extensions = ["md"]
exclude = ["drafts"]

[processing]
max_processes = 2
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.content.extensions, vec!["md"]);
        assert_eq!(config.content.exclude, vec!["drafts"]);
        assert_eq!(config.processing.max_processes, Some(2));
        assert_eq!(config.content.ordering_file, "_meta.toml");
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[content]\nextensionz = [\"md\"]\n",
        )
        .unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[theme]\ncolor = \"red\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_empty_extensions() {
        let mut config = SiteConfig::default();
        config.content.extensions.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_skill_file_must_be_content() {
        let mut config = SiteConfig::default();
        config.content.skill_file = "SKILL.txt".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_references_dir_single_component() {
        let mut config = SiteConfig::default();
        config.archive.references_dir = "a/b".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_debounce_non_zero() {
        let mut config = SiteConfig::default();
        config.watch.debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let merged = merge_toml(toml::Value::Integer(1), toml::Value::Integer(2));
        assert_eq!(merged.as_integer(), Some(2));
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
