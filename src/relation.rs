// fsgraph/src/relation.rs
//! Relation records: one row of the flat parent/child table pulled from the store.
//!
//! Two shapes:
//! - `RawRow` is what comes off the wire. Every column is optional.
//! - `RelationRecord` is the validated form the ingestor consumes.
//!
//! Validation happens once, at the `TryFrom<RawRow>` boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Entry kind. Wire tags are `"dir"` and `"file"`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    #[serde(rename = "dir", alias = "directory")]   Directory,
    #[serde(rename = "file")]                        File,
}

impl NodeKind {
    /// Case-insensitive tag parse. Unknown tags yield `None`.
    pub fn from_tag_ic<S: AsRef<str>>(s: S) -> Option<Self> {
        match s.as_ref().trim().to_ascii_lowercase().as_str() {
            "dir" | "directory" => Some(NodeKind::Directory),
            "file"              => Some(NodeKind::File),
            _                   => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Directory => "dir",
            NodeKind::File      => "file",
        }
    }

    /// Sibling sort rank: directories first.
    pub fn rank(self) -> u8 {
        match self {
            NodeKind::Directory => 0,
            NodeKind::File      => 1,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A row exactly as the query collaborator hands it over.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawRow {
    pub item: Option<String>,
    pub label: Option<String>,
    pub kind: Option<String>,
    pub parent: Option<String>,
    pub parent_label: Option<String>,
}

/// Validated relation record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRecord {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub parent: Option<String>,
    pub parent_label: Option<String>,
}

impl RelationRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            parent: None,
            parent_label: None,
        }
    }

    /// Builder-style parent edge.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>, parent_label: Option<&str>) -> Self {
        self.parent = Some(parent.into());
        self.parent_label = parent_label.map(str::to_string);
        self
    }
}

/// Why a row was rejected. Rejected rows are skipped, never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("row {row}: missing item identifier")]
    MissingId { row: usize },
    #[error("row {row} ({id}): missing label")]
    MissingLabel { row: usize, id: String },
    #[error("row {row} ({id}): missing kind")]
    MissingKind { row: usize, id: String },
    #[error("row {row} ({id}): unknown kind tag {tag:?}")]
    UnknownKind { row: usize, id: String, tag: String },
}

impl RawRow {
    /// Validate into a `RelationRecord`. `row` is only used for error reporting.
    pub fn validate(self, row: usize) -> Result<RelationRecord, IngestError> {
        let id = match non_empty(self.item) {
            Some(id) => id,
            None => return Err(IngestError::MissingId { row }),
        };
        let Some(label) = self.label else {
            return Err(IngestError::MissingLabel { row, id });
        };
        let Some(tag) = non_empty(self.kind) else {
            return Err(IngestError::MissingKind { row, id });
        };
        let Some(kind) = NodeKind::from_tag_ic(&tag) else {
            return Err(IngestError::UnknownKind { row, id, tag });
        };

        Ok(RelationRecord {
            id,
            label,
            kind,
            parent: non_empty(self.parent),
            parent_label: self.parent_label,
        })
    }
}

impl TryFrom<RawRow> for RelationRecord {
    type Error = IngestError;

    fn try_from(raw: RawRow) -> Result<Self, Self::Error> {
        raw.validate(0)
    }
}

// An empty identifier is as good as none; labels may legitimately be empty.
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/* ================================== Tests ================================== */
