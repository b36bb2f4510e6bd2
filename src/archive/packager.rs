//! Turning a manifest into archive bytes.
//!
//! The [`Packager`] trait is the seam between what goes into a bundle
//! (the manifest, owned by this crate) and how it is encoded. The production
//! implementation is [`ZipPackager`].

use super::{ArchiveError, ArchiveManifest};
use crate::config::Compression;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Encodes a manifest into a single archive.
///
/// Implementations must be deterministic: the same manifest always yields the
/// same bytes, so published bundles can be compared by digest.
pub trait Packager: Sync {
    /// File extension for produced archives, without the dot.
    fn extension(&self) -> &'static str;

    /// Encode all manifest entries, in order.
    fn package(&self, manifest: &ArchiveManifest) -> Result<Vec<u8>, ArchiveError>;
}

/// Zip archives with fixed timestamps and permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPackager {
    compression: Compression,
}

impl ZipPackager {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    fn options(&self) -> SimpleFileOptions {
        let method = match self.compression {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
        };
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
    }
}

impl Packager for ZipPackager {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn package(&self, manifest: &ArchiveManifest) -> Result<Vec<u8>, ArchiveError> {
        let options = self.options();
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &manifest.entries {
            writer.start_file(entry.path.as_str(), options)?;
            writer.write_all(entry.content.as_bytes())?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::archive::ManifestEntry;
    use std::io::Read;
    use std::sync::Mutex;

    /// Packager that records manifests and emits their paths as bytes.
    #[derive(Default)]
    pub struct MockPackager {
        pub packaged: Mutex<Vec<Vec<String>>>,
    }

    impl Packager for MockPackager {
        fn extension(&self) -> &'static str {
            "mock"
        }

        fn package(&self, manifest: &ArchiveManifest) -> Result<Vec<u8>, ArchiveError> {
            let paths: Vec<String> = manifest.entries.iter().map(|e| e.path.clone()).collect();
            let bytes = paths.join("\n").into_bytes();
            self.packaged.lock().unwrap().push(paths);
            Ok(bytes)
        }
    }

    fn sample() -> ArchiveManifest {
        ArchiveManifest {
            entries: vec![
                ManifestEntry {
                    path: "SKILL.md".to_string(),
                    content: "---\ntitle: S\n---\nskill body\n".to_string(),
                },
                ManifestEntry {
                    path: "references/api.md".to_string(),
                    content: "---\ntitle: API\n---\napi body\n".to_string(),
                },
            ],
        }
    }

    fn read_back(bytes: Vec<u8>) -> Vec<(String, String)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn zip_preserves_order_and_content() {
        let packager = ZipPackager::new(Compression::Deflated);
        let files = read_back(packager.package(&sample()).unwrap());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].0, "SKILL.md");
        assert_eq!(files[1].0, "references/api.md");
        assert_eq!(files[1].1, "---\ntitle: API\n---\napi body\n");
    }

    #[test]
    fn zip_is_reproducible() {
        for compression in [Compression::Stored, Compression::Deflated] {
            let packager = ZipPackager::new(compression);
            let a = packager.package(&sample()).unwrap();
            let b = packager.package(&sample()).unwrap();
            assert_eq!(a, b, "{compression:?} output differs between runs");
        }
    }

    #[test]
    fn stored_entries_uncompressed() {
        let bytes = ZipPackager::new(Compression::Stored)
            .package(&sample())
            .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
    }

    #[test]
    fn empty_manifest_packages() {
        let bytes = ZipPackager::default()
            .package(&ArchiveManifest::default())
            .unwrap();
        assert!(read_back(bytes).is_empty());
    }
}
