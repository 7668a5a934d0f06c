//! Document node structures
//!
//! Nodes are produced by the external parser on every render pass and have no
//! persistent identity across passes. Every node normalizes to either a plain
//! text span or a delimited block before it reaches the resolver, so the
//! matching logic stays kind-agnostic.

use serde::{Deserialize, Serialize};

use crate::anchoring::block_id;

/// Structural kind of a document node
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Paragraph,
    Heading,
    ListItem,
    Blockquote,
    Code,
    Table,
    Math,
}

impl NodeKind {
    /// Whether this kind is a delimited block (identified by content hash)
    /// rather than a plain text span
    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Code | NodeKind::Table | NodeKind::Math)
    }

    /// Lowercase label used as the block-id prefix and in render classes
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::ListItem => "listitem",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Code => "code",
            NodeKind::Table => "table",
            NodeKind::Math => "math",
        }
    }
}

/// A structural node from the current render pass
///
/// Transient: recomputed on every pass, equal across passes only by content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocNode {
    /// Position in the node list (document order)
    pub index: usize,

    pub kind: NodeKind,

    /// Raw text content of the node
    pub text: String,

    /// 1-based source line this node starts on, when the parser knows it
    #[serde(default)]
    pub source_line: Option<usize>,

    /// Annotation ids the previous pass's injection stamped onto this node's
    /// rendered element, reported back by the view layer. Fast path for
    /// highlights that are already on screen.
    #[serde(default)]
    pub carried_annotation_ids: Vec<String>,
}

/// A node normalized for anchor resolution
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent<'a> {
    /// Plain text span searched directly for selected text
    Span(&'a str),

    /// Delimited block identified by its content hash; inline search still
    /// operates on the raw text inside it
    Block { block_id: String, raw: &'a str },
}

impl DocNode {
    pub fn new(index: usize, kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            text: text.into(),
            source_line: None,
            carried_annotation_ids: Vec::new(),
        }
    }

    pub fn with_source_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    /// Normalize this node for resolution
    pub fn content(&self) -> NodeContent<'_> {
        if self.kind.is_block() {
            NodeContent::Block {
                block_id: block_id::identify(self.kind, &self.text),
                raw: &self.text,
            }
        } else {
            NodeContent::Span(&self.text)
        }
    }

    /// Content-derived block id, for block kinds only
    pub fn block_id(&self) -> Option<String> {
        if self.kind.is_block() {
            Some(block_id::identify(self.kind, &self.text))
        } else {
            None
        }
    }

    /// Whether this node carried the given annotation id over from the
    /// previous pass
    pub fn carries(&self, annotation_id: &str) -> bool {
        self.carried_annotation_ids.iter().any(|id| id == annotation_id)
    }
}
