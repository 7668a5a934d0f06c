//! Highlight composition for one text node
//!
//! Splits a node's text into alternating plain and highlighted segments when
//! several annotations' anchors land in it. Overlaps are resolved by a greedy
//! sweep: matches are sorted by start offset and a later-starting match that
//! overlaps an accepted one is dropped entirely, never split or merged. The
//! output segments always partition the input text exactly once.
//!
//! Dropping a match here is a display decision only; orphan status is decided
//! solely by the orphan detector.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AnnotationKind, CharRange};

/// A highlight request against one node's text
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightMatch {
    pub range: CharRange,
    pub annotation_id: String,
    pub kind: AnnotationKind,
}

/// One piece of a node's text, either plain or carrying a highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    Plain {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Highlighted {
        text: String,
        annotation_id: String,
        annotation_kind: AnnotationKind,
    },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } => text,
            Segment::Highlighted { text, .. } => text,
        }
    }
}

/// A composition fault for one node
///
/// Caught at the injection boundary, where the node falls back to its
/// unannotated rendering so one bad annotation cannot blank the view.
#[derive(Debug, Error, PartialEq)]
pub enum ComposeError {
    #[error("match range {start}..{end} exceeds text length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("match range {start}..{end} does not sit on character boundaries")]
    RangeOffBoundary { start: usize, end: usize },
}

/// Split `text` into plain and highlighted segments
///
/// Matches are sorted ascending by start; a match is accepted only when its
/// start is at or past the end of the last accepted match. The returned
/// segments concatenate back to exactly `text`.
pub fn compose_highlights(
    text: &str,
    matches: &[HighlightMatch],
) -> Result<Vec<Segment>, ComposeError> {
    let mut ordered: Vec<&HighlightMatch> = matches.iter().collect();
    // Stable sort: matches sharing a start offset keep their input order
    ordered.sort_by_key(|m| m.range.start);

    let mut segments = Vec::new();
    let mut cursor = 0usize;

    for m in ordered {
        let CharRange { start, end } = m.range;
        if start < cursor {
            // Overlaps the previously accepted match: dropped entirely
            continue;
        }
        if end > text.len() || start > end {
            return Err(ComposeError::RangeOutOfBounds { start, end, len: text.len() });
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(ComposeError::RangeOffBoundary { start, end });
        }
        if start > cursor {
            segments.push(Segment::Plain {
                text: text[cursor..start].to_string(),
            });
        }
        segments.push(Segment::Highlighted {
            text: text[start..end].to_string(),
            annotation_id: m.annotation_id.clone(),
            annotation_kind: m.kind,
        });
        cursor = end;
    }

    if cursor < text.len() {
        segments.push(Segment::Plain {
            text: text[cursor..].to_string(),
        });
    }

    Ok(segments)
}
