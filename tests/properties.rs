//! Property tests for ingestion and rendering.

use fsgraph::ingest::ingest;
use fsgraph::relation::{NodeKind, RelationRecord};
use fsgraph::tree_view::{node_label_line, render_report, sorted_children, CanonicalRoot, FILE_LABEL_MAX};
use fsgraph::util::{short_id, truncate_chars};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Small id pool so records collide, repeat, and reference each other.
fn id_strategy() -> impl Strategy<Value = String> {
    (0u8..12).prop_map(|i| format!("urn:uuid:{i:02}-node"))
}

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "[a-zA-Z0-9 ._-]{0,70}",
        "[é日本a]{40,60}",
    ]
}

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![Just(NodeKind::Directory), Just(NodeKind::File)]
}

fn record_strategy() -> impl Strategy<Value = RelationRecord> {
    (
        id_strategy(),
        label_strategy(),
        kind_strategy(),
        proptest::option::of(id_strategy()),
        proptest::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(id, label, kind, parent, parent_label)| {
            let rec = RelationRecord::new(id, label, kind);
            match parent {
                Some(p) => rec.with_parent(p, parent_label.as_deref()),
                None => rec,
            }
        })
}

fn records_strategy() -> impl Strategy<Value = Vec<RelationRecord>> {
    prop::collection::vec(record_strategy(), 0..40)
}

// ============================================================================
// Ingestion
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_referenced_id_is_a_node(records in records_strategy()) {
        let t = ingest(&records);
        for r in &records {
            prop_assert!(t.get(&r.id).is_some());
            if let Some(p) = &r.parent {
                prop_assert!(t.get(p).is_some(), "parent {} missing", p);
            }
        }
    }

    #[test]
    fn each_node_has_at_most_one_parent(records in records_strategy()) {
        let t = ingest(&records);
        let mut seen = std::collections::HashSet::new();
        for (_, node) in t.iter() {
            for &kid in &node.children {
                prop_assert!(seen.insert(kid), "child listed twice");
                prop_assert!(t.node(kid).parent.is_some());
            }
        }
    }

    #[test]
    fn ingesting_twice_changes_nothing(records in records_strategy()) {
        let once = ingest(&records);
        let doubled: Vec<_> = records.iter().chain(records.iter()).cloned().collect();
        let twice = ingest(&doubled);

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.roots(), twice.roots());
        prop_assert_eq!(
            render_report(&once, &CanonicalRoot),
            render_report(&twice, &CanonicalRoot)
        );
    }

    #[test]
    fn roots_never_had_a_parent(records in records_strategy()) {
        let t = ingest(&records);
        for root in t.roots() {
            let id = &t.node(root).id;
            prop_assert!(!records.iter().any(|r| &r.id == id && r.parent.is_some()));
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn rendering_is_deterministic(records in records_strategy()) {
        let t = ingest(&records);
        prop_assert_eq!(render_report(&t, &CanonicalRoot), render_report(&t, &CanonicalRoot));
    }

    #[test]
    fn directories_come_first(records in records_strategy()) {
        let t = ingest(&records);
        for (id, _) in t.iter() {
            let ranks: Vec<u8> = sorted_children(&t, id)
                .into_iter()
                .map(|k| t.node(k).kind.rank())
                .collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn file_labels_are_capped(records in records_strategy()) {
        let t = ingest(&records);
        for (id, node) in t.iter() {
            if node.kind != NodeKind::File {
                continue;
            }
            let shown = truncate_chars(&node.label, FILE_LABEL_MAX);
            prop_assert!(shown.chars().count() <= FILE_LABEL_MAX);
            prop_assert_eq!(
                node_label_line(&t, id),
                format!("📄 {} ({}...)", shown, short_id(&node.id))
            );
        }
    }

    #[test]
    fn summary_counts_every_node(records in records_strategy()) {
        let t = ingest(&records);
        let dirs = t.iter().filter(|(_, n)| n.kind == NodeKind::Directory).count();
        let files = t.len() - dirs;
        let lines = render_report(&t, &CanonicalRoot);
        prop_assert_eq!(
            lines.last().cloned(),
            Some(format!("=== Total: {dirs} directories, {files} files ==="))
        );
    }
}
