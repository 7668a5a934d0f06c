//! Resolved anchor types
//!
//! Anchors are render-pass-scoped: they tie an annotation id to the place in
//! the current node list where its highlight belongs. They are never
//! persisted; the next pass recomputes them from scratch.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` within a node's text
///
/// Offsets always come from substring searches over the same text, so they
/// are guaranteed to sit on UTF-8 character boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if two ranges overlap (share at least one byte)
    pub fn overlaps(&self, other: &CharRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// How confident the resolver is in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorConfidence {
    /// Direct id carry-over or block-id match
    Exact,

    /// Inline match found within the annotation's line-hint window
    LineScoped,

    /// Inline match found by full-document fallback scan
    Unscoped,
}

/// Where in the current render an annotation's highlight belongs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "targetKind", rename_all = "camelCase")]
pub enum AnchorTarget {
    /// Whole structural block, optionally narrowed to a span inside it
    #[serde(rename_all = "camelCase")]
    Block {
        block_id: String,
        node_index: usize,
        #[serde(default)]
        inner_range: Option<CharRange>,
    },

    /// Span of text within a single node
    #[serde(rename_all = "camelCase")]
    Inline { node_index: usize, range: CharRange },
}

impl AnchorTarget {
    /// Index of the node this anchor lands on
    pub fn node_index(&self) -> usize {
        match self {
            AnchorTarget::Block { node_index, .. } => *node_index,
            AnchorTarget::Inline { node_index, .. } => *node_index,
        }
    }
}

/// A resolved anchor for one annotation in the current pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAnchor {
    pub annotation_id: String,
    #[serde(flatten)]
    pub target: AnchorTarget,
    pub confidence: AnchorConfidence,
}
