// fsgraph/src/tree_view.rs

use std::cmp::Ordering;
use tracing::{info, warn};

use crate::{
    ingest::{NodeId, NodeTable},
    relation::NodeKind,
    util::{short_id, truncate_chars},
};

pub const HEADER: &str = "=== LIQK Filesystem ===";
pub const ROOT_LABEL: &str = "/";
pub const FILE_LABEL_MAX: usize = 50;

const DIR_MARK: &str = "📁";
const FILE_MARK: &str = "📄";
const TEE: &str = "├── ";
const CORNER: &str = "└── ";
const BAR: &str = "│   ";
const BLANK: &str = "    ";

/// Picks which root gets rendered.
pub trait RootSelector {
    fn select(&self, table: &NodeTable) -> Option<NodeId>;
}

/// The first root labelled exactly `/`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalRoot;

impl RootSelector for CanonicalRoot {
    fn select(&self, table: &NodeTable) -> Option<NodeId> {
        table
            .roots()
            .into_iter()
            .find(|&id| table.node(id).label == ROOT_LABEL)
    }
}

impl<F> RootSelector for F
where
    F: Fn(&NodeTable) -> Option<NodeId>,
{
    fn select(&self, table: &NodeTable) -> Option<NodeId> {
        self(table)
    }
}

/// Directories first, then label by code point, then identifier.
pub fn sibling_order(table: &NodeTable, a: NodeId, b: NodeId) -> Ordering {
    let (na, nb) = (table.node(a), table.node(b));
    na.kind
        .rank()
        .cmp(&nb.kind.rank())
        .then_with(|| na.label.cmp(&nb.label))
        .then_with(|| na.id.cmp(&nb.id))
}

pub fn sorted_children(table: &NodeTable, id: NodeId) -> Vec<NodeId> {
    let mut kids = table.node(id).children.clone();
    kids.sort_by(|&a, &b| sibling_order(table, a, b));
    kids
}

/// One body line, without indentation or connector.
pub fn node_label_line(table: &NodeTable, id: NodeId) -> String {
    let node = table.node(id);
    let short = short_id(&node.id);
    match node.kind {
        NodeKind::Directory => format!("{DIR_MARK} {} ({short}...)", node.label),
        NodeKind::File => format!(
            "{FILE_MARK} {} ({short}...)",
            truncate_chars(&node.label, FILE_LABEL_MAX)
        ),
    }
}

pub fn render_root_line(table: &NodeTable, root: NodeId) -> String {
    format!("{DIR_MARK} {ROOT_LABEL} (root: {}...)", short_id(&table.node(root).id))
}

/// Render the descendants of `root` as connector lines, starting at empty indentation.
/// The root itself is not emitted. Files and directories share one indentation
/// column (`prefix + connector`), unlike the old Python lister which pushed file
/// lines four spaces further right.
pub fn render_subtree(table: &NodeTable, root: NodeId) -> Vec<String> {
    fn walk(
        table: &NodeTable,
        here: NodeId,
        prefix: &str,
        on_path: &mut Vec<NodeId>,
        out: &mut Vec<String>,
    ) {
        let mut kids = sorted_children(table, here);
        kids.retain(|kid| {
            let looped = on_path.contains(kid);
            if looped {
                warn!(node = %table.node(*kid).id, "cycle in parent chain, not descending");
            }
            !looped
        });
        let last = kids.len().saturating_sub(1);

        for (i, &kid) in kids.iter().enumerate() {
            let is_last = i == last;
            let connector = if is_last { CORNER } else { TEE };
            out.push(format!("{prefix}{connector}{}", node_label_line(table, kid)));

            let next = format!("{prefix}{}", if is_last { BLANK } else { BAR });
            on_path.push(kid);
            walk(table, kid, &next, on_path, out);
            on_path.pop();
        }
    }

    let mut out = Vec::new();
    let mut on_path = vec![root];
    walk(table, root, "", &mut on_path, &mut out);
    out
}

pub fn summary_line(table: &NodeTable) -> String {
    format!(
        "=== Total: {} directories, {} files ===",
        table.count_kind(NodeKind::Directory),
        table.count_kind(NodeKind::File)
    )
}

/// Full report: header, selected tree (if any), summary.
pub fn render_report<S: RootSelector + ?Sized>(table: &NodeTable, selector: &S) -> Vec<String> {
    let mut lines = vec![HEADER.to_string(), String::new()];

    match selector.select(table) {
        Some(root) => {
            lines.push(render_root_line(table, root));
            lines.extend(render_subtree(table, root));
        }
        None => info!(roots = table.roots().len(), "no canonical root, tree body left empty"),
    }

    lines.push(String::new());
    lines.push(summary_line(table));
    lines
}

/* ================================== Tests ================================== */
