// fsgraph/src/ingest.rs

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::relation::{IngestError, NodeKind, RawRow, RelationRecord};

/// Label given to a parent that was referenced without one.
pub const PLACEHOLDER_LABEL: &str = "?";

/// Index into the arena. Only meaningful for the `NodeTable` that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// Unordered; the renderer sorts at render time.
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Label/kind came from the node's own record (not a placeholder).
    defined: bool,
    /// Seen as the subject of a record that named a parent.
    parented: bool,
}

impl Node {
    fn placeholder(id: &str, label: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            label: label.unwrap_or(PLACEHOLDER_LABEL).to_string(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            parent: None,
            defined: false,
            parented: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        !self.defined
    }
}

/// What happened to the parent edge of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    None,
    Attached,
    Duplicate,
    /// Child already hangs under another parent (or names itself); first parent wins.
    Conflict,
}

/// Arena of nodes keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    root_candidates: Vec<NodeId>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn lookup(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.lookup(key).map(|id| self.node(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Nodes never observed with a parent, in the order first seen parentless.
    pub fn roots(&self) -> Vec<NodeId> {
        self.root_candidates
            .iter()
            .copied()
            .filter(|id| !self.nodes[id.0].parented)
            .collect()
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Fold one record into the table.
    pub fn insert(&mut self, rec: &RelationRecord) -> Edge {
        let me = self.resolve_subject(rec);

        let Some(parent_key) = rec.parent.as_deref() else {
            if !self.root_candidates.contains(&me) {
                self.root_candidates.push(me);
            }
            return Edge::None;
        };

        self.nodes[me.0].parented = true;
        let parent = self.resolve_parent(parent_key, rec.parent_label.as_deref());

        if parent == me {
            return Edge::Conflict;
        }
        match self.nodes[me.0].parent {
            Some(p) if p == parent => Edge::Duplicate,
            Some(_) => Edge::Conflict,
            None => {
                self.nodes[me.0].parent = Some(parent);
                self.nodes[parent.0].children.push(me);
                Edge::Attached
            }
        }
    }

    fn resolve_subject(&mut self, rec: &RelationRecord) -> NodeId {
        if let Some(id) = self.lookup(&rec.id) {
            let node = &mut self.nodes[id.0];
            // first self record wins; placeholders get completed
            if !node.defined {
                node.label.clone_from(&rec.label);
                node.kind = rec.kind;
                node.defined = true;
            }
            return id;
        }
        self.push(Node {
            id: rec.id.clone(),
            label: rec.label.clone(),
            kind: rec.kind,
            children: Vec::new(),
            parent: None,
            defined: true,
            parented: false,
        })
    }

    fn resolve_parent(&mut self, key: &str, label: Option<&str>) -> NodeId {
        match self.lookup(key) {
            Some(id) => id,
            None => self.push(Node::placeholder(key, label)),
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(node.id.clone(), id);
        self.nodes.push(node);
        id
    }
}

/// Outcome of ingesting one result set.
#[derive(Debug, Default)]
pub struct Ingested {
    pub table: NodeTable,
    /// Rows rejected at validation, in input order.
    pub skipped: Vec<IngestError>,
    pub duplicates: usize,
    pub conflicts: usize,
}

/// Build the node table from already-validated records.
pub fn ingest(records: &[RelationRecord]) -> NodeTable {
    let mut table = NodeTable::new();
    for rec in records {
        table.insert(rec);
    }
    table
}

/// Validate and ingest raw rows. Malformed rows are logged and skipped.
pub fn ingest_rows<I>(rows: I) -> Ingested
where
    I: IntoIterator<Item = RawRow>,
{
    let mut out = Ingested::default();

    for (i, raw) in rows.into_iter().enumerate() {
        let rec = match raw.validate(i + 1) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping malformed relation row");
                out.skipped.push(e);
                continue;
            }
        };
        match out.table.insert(&rec) {
            Edge::Duplicate => out.duplicates += 1,
            Edge::Conflict => {
                warn!(
                    item = %rec.id,
                    parent = rec.parent.as_deref().unwrap_or_default(),
                    "ignoring second parent edge"
                );
                out.conflicts += 1;
            }
            Edge::None | Edge::Attached => {}
        }
    }

    debug!(
        nodes = out.table.len(),
        skipped = out.skipped.len(),
        duplicates = out.duplicates,
        conflicts = out.conflicts,
        "ingestion done"
    );
    out
}

/* ================================== Tests ================================== */
