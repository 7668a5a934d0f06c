//! Persistent annotation records
//!
//! Annotations are the only data this engine shares with the persistence
//! layer. They carry content-derived anchor fields (selected text, block id,
//! line hints, occurrence index) instead of absolute character offsets, so
//! they survive the document being re-parsed into a fresh node tree on every
//! edit.

use serde::{Deserialize, Serialize};

/// The kind of note an annotation represents
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Free-form margin comment
    Comment,

    /// Review remark expected to be addressed and resolved
    Review,

    /// Open item awaiting a decision
    Pending,

    /// Threaded discussion with replies
    Discussion,
}

/// Lifecycle status of an annotation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStatus {
    /// Anchored and awaiting action
    Active,

    /// Explicitly resolved by the user (still displayed, dimmed)
    Resolved,

    /// Anchor text could not be located anywhere in the current document
    Orphaned,
}

/// A single reply in an annotation's thread
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub author: String,
    pub content: String,
    /// Opaque timestamp string minted by the caller, passed through unmodified
    pub timestamp: String,
}

/// A typed note attached to a span of text or a structural block
///
/// Exactly one anchor family is meaningful per record: block annotations set
/// `block_id`, inline annotations set a non-empty `selected_text` (optionally
/// with line hints and an occurrence index). A record with neither is
/// malformed and is skipped during resolution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Identifier minted by the persistence layer (opaque to the engine)
    pub id: String,

    /// Kind of note
    #[serde(rename = "type")]
    pub kind: AnnotationKind,

    /// The note body
    pub content: String,

    /// Exact text the user selected (empty for block annotations)
    #[serde(default)]
    pub selected_text: String,

    /// Content-derived id of the annotated block, if this is a block annotation
    #[serde(default)]
    pub block_id: Option<String>,

    /// 1-based source line where the selection started, if known
    #[serde(default)]
    pub start_line: Option<usize>,

    /// 1-based source line where the selection ended, if known
    #[serde(default)]
    pub end_line: Option<usize>,

    /// Which numbered occurrence of `selected_text` was selected (0-based).
    /// Only meaningful for inline annotations.
    #[serde(default)]
    pub occurrence_index: Option<usize>,

    pub status: AnnotationStatus,

    /// Ordered reply thread
    #[serde(default)]
    pub replies: Vec<Reply>,

    /// Opaque timestamp strings, passed through unmodified
    pub created_at: String,
    pub updated_at: String,
}

impl Annotation {
    /// Whether this annotation targets a structural block
    pub fn is_block(&self) -> bool {
        self.block_id.is_some()
    }

    /// Whether this record carries at least one usable anchor field
    ///
    /// Records failing this check are skipped during resolution and logged,
    /// never allowed to crash rendering.
    pub fn is_well_formed(&self) -> bool {
        self.block_id.is_some() || !self.selected_text.is_empty()
    }

    /// Append a reply to the thread
    pub fn add_reply(&mut self, reply: Reply) {
        self.replies.push(reply);
    }
}
