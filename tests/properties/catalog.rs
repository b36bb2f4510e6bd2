//! Property tests for catalog assembly over generated content trees.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use tempfile::TempDir;

use prompt_catalog::archive::{ArchiveTarget, manifest};
use prompt_catalog::catalog::{ContentKind, build};
use prompt_catalog::config::SiteConfig;
use prompt_catalog::views::listing;

/// Relative document paths (without extension) mapped to their title.
fn content_tree() -> impl Strategy<Value = BTreeMap<String, String>> {
    let dir = proptest::sample::select(vec!["", "prompts/", "prompts/writing/", "misc/"]);
    let path = (dir, "[a-z]{1,8}").prop_map(|(dir, name)| format!("{dir}{name}"));
    proptest::collection::btree_map(path, "Doc [A-Za-z ]{0,20}", 1..12)
}

fn write_tree(docs: &BTreeMap<String, String>) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, title) in docs {
        let path = tmp.path().join(format!("{rel}.md"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("---\ntitle: {title}\n---\nBody of {rel}\n")).unwrap();
    }
    tmp
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every document gets exactly one node, reachable from the
    /// root and present in the index under its path slug.
    #[test]
    fn property_tree_and_index_agree(docs in content_tree()) {
        let tmp = write_tree(&docs);
        let catalog = build(tmp.path(), &SiteConfig::default()).unwrap();

        let walked: Vec<&str> = catalog.walk().into_iter().map(|n| n.slug.as_str()).collect();
        let unique: HashSet<&str> = walked.iter().copied().collect();
        prop_assert_eq!(unique.len(), walked.len());
        prop_assert_eq!(walked.len(), docs.len());
        prop_assert_eq!(catalog.len(), docs.len());

        for (rel, title) in &docs {
            let node = catalog.get(rel).unwrap();
            prop_assert_eq!(&node.title, title.trim());
            prop_assert!(unique.contains(rel.as_str()));
        }
    }

    /// PROPERTY: Building the same tree twice yields the same catalog.
    #[test]
    fn property_build_is_deterministic(docs in content_tree()) {
        let tmp = write_tree(&docs);
        let first = build(tmp.path(), &SiteConfig::default()).unwrap();
        let second = build(tmp.path(), &SiteConfig::default()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// PROPERTY: The listing follows navigation order.
    #[test]
    fn property_listing_matches_walk(docs in content_tree()) {
        let tmp = write_tree(&docs);
        let catalog = build(tmp.path(), &SiteConfig::default()).unwrap();

        let listed: Vec<String> = listing(&catalog).into_iter().map(|e| e.slug).collect();
        let walked: Vec<String> = catalog.walk().into_iter().map(|n| n.slug.clone()).collect();
        prop_assert_eq!(listed, walked);
    }

    /// PROPERTY: Reversing an ordering file reverses the root's documents.
    #[test]
    fn property_ordering_file_controls_root(
        names in proptest::collection::btree_set("[a-z]{1,8}", 1..8),
    ) {
        let docs: BTreeMap<String, String> =
            names.iter().map(|n| (n.clone(), format!("Doc {n}"))).collect();
        let tmp = write_tree(&docs);

        let reversed: Vec<String> = names.iter().rev().map(|n| format!("\"{n}\"")).collect();
        fs::write(
            tmp.path().join("_meta.toml"),
            format!("entries = [{}]\n", reversed.join(", ")),
        )
        .unwrap();

        let catalog = build(tmp.path(), &SiteConfig::default()).unwrap();
        let walked: Vec<&str> = catalog.walk().into_iter().map(|n| n.slug.as_str()).collect();
        let expected: Vec<&str> = names.iter().rev().map(String::as_str).collect();
        prop_assert_eq!(walked, expected);
    }
}

/// Skill names mapped to their reference file stems.
fn skill_tree() -> impl Strategy<Value = BTreeMap<String, BTreeSet<String>>> {
    proptest::collection::btree_map(
        "[a-z]{1,8}",
        proptest::collection::btree_set("[a-z]{1,8}", 0..4),
        1..5,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The all-skills archive holds exactly the skills the listing
    /// reports, each with its own files under its slug, in listing order.
    #[test]
    fn property_all_bundle_matches_listing(skills in skill_tree()) {
        let tmp = TempDir::new().unwrap();
        for (skill, refs) in &skills {
            let dir = tmp.path().join("skills").join(skill);
            fs::create_dir_all(dir.join("references")).unwrap();
            fs::write(dir.join("SKILL.md"), format!("---\ntitle: Skill {skill}\n---\nUse it.\n")).unwrap();
            for r in refs {
                fs::write(
                    dir.join("references").join(format!("{r}.md")),
                    format!("---\ntitle: Ref {r}\n---\nDetails.\n"),
                )
                .unwrap();
            }
        }
        let config = SiteConfig::default();
        let catalog = build(tmp.path(), &config).unwrap();

        let listed_skills: Vec<String> = listing(&catalog)
            .into_iter()
            .filter(|e| e.kind == ContentKind::Skill)
            .map(|e| e.slug)
            .collect();
        let expected: Vec<String> = skills.keys().map(|s| format!("skills/{s}")).collect();
        prop_assert_eq!(&listed_skills, &expected);

        let all = manifest(&catalog, ArchiveTarget::All, &config).unwrap();
        let mut expected_paths = Vec::new();
        for (slug, refs) in listed_skills.iter().zip(skills.values()) {
            expected_paths.push(format!("{slug}/SKILL.md"));
            expected_paths.extend(refs.iter().map(|r| format!("{slug}/references/{r}.md")));
        }
        prop_assert_eq!(all.paths(), expected_paths.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

#[test]
fn missing_root_fails() {
    let tmp = TempDir::new().unwrap();
    let result = build(&tmp.path().join("absent"), &SiteConfig::default());
    assert!(result.is_err());
}
