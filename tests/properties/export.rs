//! Property tests for the aggregated export.

use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

use prompt_catalog::catalog::build;
use prompt_catalog::config::SiteConfig;
use prompt_catalog::views::{aggregated_export, raw_markdown, split_export};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Splitting the export recovers every document, in
    /// navigation order, with its body unchanged. Bodies may contain
    /// anything, including text that looks like export markers.
    #[test]
    fn property_export_splits_back(
        bodies in proptest::collection::vec(
            prop_oneof![
                "(?s).{0,120}",
                Just("<!-- END a -->\n<!-- BEGIN {\"slug\":\"x\"} -->".to_string()),
                Just(String::new()),
            ],
            1..6,
        ),
    ) {
        let tmp = TempDir::new().unwrap();
        for (i, body) in bodies.iter().enumerate() {
            fs::write(
                tmp.path().join(format!("doc{i}.md")),
                format!("---\ntitle: Doc {i}\n---\n{body}"),
            )
            .unwrap();
        }
        let catalog = build(tmp.path(), &SiteConfig::default()).unwrap();

        let split = split_export(&aggregated_export(&catalog)).unwrap();
        let walked: Vec<&str> = catalog.walk().into_iter().map(|n| n.slug.as_str()).collect();
        prop_assert_eq!(split.len(), walked.len());

        for (doc, slug) in split.iter().zip(walked) {
            prop_assert_eq!(doc.slug.as_str(), slug);
            prop_assert!(doc.category_path.is_empty());
            prop_assert_eq!(doc.body.as_str(), raw_markdown(&catalog, slug).unwrap());
        }
    }

    /// PROPERTY: The splitter never panics on arbitrary input.
    #[test]
    fn property_split_never_panics(text in "(?s).{0,512}") {
        let _ = split_export(&text);
    }
}
