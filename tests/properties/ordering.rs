//! Property tests for child ordering.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

use prompt_catalog::ordering::{OrderingConfig, OrderingEntry, resolve};

/// Distinct identifiers in scan order, plus a shuffled subset to declare.
fn children_and_declared() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    proptest::collection::btree_set("[a-z]{1,6}", 1..10)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|children| {
            let len = children.len();
            (
                Just(children.clone()),
                Just(children).prop_shuffle(),
                0..=len,
            )
        })
        .prop_map(|(children, shuffled, take)| {
            (children, shuffled.into_iter().take(take).collect())
        })
}

fn config_for(declared: &[String]) -> OrderingConfig {
    OrderingConfig {
        entries: declared
            .iter()
            .map(|id| OrderingEntry {
                identifier: id.clone(),
                title_override: None,
            })
            .collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Declared children come first in declared order, the rest
    /// follow in scan order, and nothing is lost or repeated.
    #[test]
    fn property_declared_first_then_scan_order((children, declared) in children_and_declared()) {
        let ids: Vec<&str> = children.iter().map(String::as_str).collect();
        let config = config_for(&declared);

        let resolved = resolve(Some(&config), &ids, Path::new("dir")).unwrap();
        let order: Vec<&str> = resolved.iter().map(|r| ids[r.index]).collect();

        let mut expected: Vec<&str> = declared.iter().map(String::as_str).collect();
        expected.extend(ids.iter().copied().filter(|id| !declared.iter().any(|d| d == id)));
        prop_assert_eq!(order, expected);
    }

    /// PROPERTY: Without an ordering file, scan order is kept.
    #[test]
    fn property_no_config_keeps_scan_order((children, _) in children_and_declared()) {
        let ids: Vec<&str> = children.iter().map(String::as_str).collect();
        let resolved = resolve(None, &ids, Path::new("dir")).unwrap();
        let indexes: Vec<usize> = resolved.iter().map(|r| r.index).collect();
        prop_assert_eq!(indexes, (0..ids.len()).collect::<Vec<_>>());
    }

    /// PROPERTY: Declaring an identifier that is not on disk is rejected.
    #[test]
    fn property_unknown_entry_rejected(
        (children, mut declared) in children_and_declared(),
        ghost in "[A-Z]{1,6}",
    ) {
        let ids: Vec<&str> = children.iter().map(String::as_str).collect();
        declared.push(ghost);
        let result = resolve(Some(&config_for(&declared)), &ids, Path::new("dir"));
        prop_assert!(result.is_err());
    }

    /// PROPERTY: Parsing an ordering file never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(text in "(?s).{0,256}") {
        let _ = OrderingConfig::parse(&text, Path::new("_meta.toml"));
    }
}
