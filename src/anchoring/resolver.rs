//! Layered anchor resolution
//!
//! For each stored annotation, finds the place in the current node list where
//! its highlight belongs. Strategies are tried in a fixed priority order and
//! the first success wins:
//!
//! 1. a node already carries the annotation's id from the previous pass,
//! 2. content-hash block match (narrowed to the selected text when present),
//! 3. line-scoped inline search within the annotation's line-hint window,
//! 4. unscoped inline search over the whole document.
//!
//! Each text unit may be claimed by at most one annotation per pass. Claim
//! order follows the caller-visible annotation list order, never incidental
//! map iteration order.

use serde::{Deserialize, Serialize};

use crate::models::{
    AnchorConfidence, AnchorTarget, Annotation, CharRange, DocNode, NodeContent, ResolvedAnchor,
};

use super::claims::ClaimSet;

/// Tunable resolution parameters
///
/// The line tolerance band absorbs minor line drift from unrelated edits. Its
/// width is empirical, so it is configuration rather than contract.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveConfig {
    /// How far (in lines, each direction) a line-scoped search may stray from
    /// the annotation's recorded line window
    pub line_tolerance: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self { line_tolerance: 2 }
    }
}

/// Resolves stored annotations against one render pass's node list
pub struct AnchorResolver<'a> {
    nodes: &'a [DocNode],
    config: ResolveConfig,
}

impl<'a> AnchorResolver<'a> {
    pub fn new(nodes: &'a [DocNode], config: ResolveConfig) -> Self {
        Self { nodes, config }
    }

    /// Resolve every annotation, in caller-visible list order
    ///
    /// Run once per pass over non-deleted annotations. Malformed records
    /// (neither block id nor selected text) are skipped and logged, never
    /// allowed to crash the pass. Annotations with no anchor in the result
    /// are handed to the orphan detector by the caller.
    pub fn resolve_all(&self, annotations: &[Annotation]) -> Vec<ResolvedAnchor> {
        let mut claims = ClaimSet::new();
        let mut anchors = Vec::new();

        // Slice order is the caller-visible annotation list order
        for annotation in annotations {
            if !annotation.is_well_formed() {
                log::warn!(
                    "skipping malformed annotation {}: no block id and no selected text",
                    annotation.id
                );
                continue;
            }
            if let Some(anchor) = self.resolve_one(annotation, &mut claims) {
                anchors.push(anchor);
            }
        }

        anchors
    }

    /// Resolve a single annotation, claiming whatever it matches
    pub fn resolve_one(
        &self,
        annotation: &Annotation,
        claims: &mut ClaimSet,
    ) -> Option<ResolvedAnchor> {
        self.match_carried_id(annotation, claims)
            .or_else(|| self.match_block(annotation, claims))
            .or_else(|| self.match_line_scoped(annotation, claims))
            .or_else(|| self.match_unscoped(annotation, claims))
    }

    /// Layer 1: a node already carries this annotation's id from the
    /// previous pass (fast path for an already-displayed highlight)
    fn match_carried_id(
        &self,
        annotation: &Annotation,
        claims: &mut ClaimSet,
    ) -> Option<ResolvedAnchor> {
        let node = self.nodes.iter().find(|n| n.carries(&annotation.id))?;

        match node.content() {
            NodeContent::Block { block_id, .. } => {
                if claims.is_block_claimed(node.index) {
                    return None;
                }
                let inner = self.narrow_to_selection(node, annotation, claims);
                claims.claim_block(node.index);
                Some(ResolvedAnchor {
                    annotation_id: annotation.id.clone(),
                    target: AnchorTarget::Block {
                        block_id,
                        node_index: node.index,
                        inner_range: inner,
                    },
                    confidence: AnchorConfidence::Exact,
                })
            }
            NodeContent::Span(_) => {
                let range = first_free_occurrence(node, &annotation.selected_text, claims)?;
                claims.claim_range(node.index, range);
                Some(ResolvedAnchor {
                    annotation_id: annotation.id.clone(),
                    target: AnchorTarget::Inline {
                        node_index: node.index,
                        range,
                    },
                    confidence: AnchorConfidence::Exact,
                })
            }
        }
    }

    /// Layer 2: match by content-derived block id
    ///
    /// The whole block is the anchor. When the annotation also recorded
    /// selected text, the match narrows to the first unclaimed substring
    /// occurrence inside the block.
    fn match_block(
        &self,
        annotation: &Annotation,
        claims: &mut ClaimSet,
    ) -> Option<ResolvedAnchor> {
        let wanted = annotation.block_id.as_deref()?;

        let node = self.nodes.iter().find(|n| {
            !claims.is_block_claimed(n.index)
                && matches!(n.content(), NodeContent::Block { block_id, .. } if block_id == wanted)
        })?;

        let inner = self.narrow_to_selection(node, annotation, claims);
        claims.claim_block(node.index);
        Some(ResolvedAnchor {
            annotation_id: annotation.id.clone(),
            target: AnchorTarget::Block {
                block_id: wanted.to_string(),
                node_index: node.index,
                inner_range: inner,
            },
            confidence: AnchorConfidence::Exact,
        })
    }

    /// Layer 3: inline search restricted to nodes whose source line falls in
    /// the annotation's line window, widened by the tolerance band
    fn match_line_scoped(
        &self,
        annotation: &Annotation,
        claims: &mut ClaimSet,
    ) -> Option<ResolvedAnchor> {
        if annotation.block_id.is_some() || annotation.selected_text.is_empty() {
            return None;
        }
        let (start_line, end_line) = match (annotation.start_line, annotation.end_line) {
            (Some(s), Some(e)) => (s, e),
            _ => return None,
        };

        let tol = self.config.line_tolerance;
        let lo = start_line.saturating_sub(tol);
        let hi = end_line.saturating_add(tol);

        for node in self.nodes {
            match node.source_line {
                Some(line) if line >= lo && line <= hi => {}
                _ => continue,
            }
            if let Some(range) = first_free_occurrence(node, &annotation.selected_text, claims) {
                claims.claim_range(node.index, range);
                return Some(ResolvedAnchor {
                    annotation_id: annotation.id.clone(),
                    target: AnchorTarget::Inline {
                        node_index: node.index,
                        range,
                    },
                    confidence: AnchorConfidence::LineScoped,
                });
            }
        }

        None
    }

    /// Layer 4: first unclaimed occurrence of the selected text anywhere in
    /// document order
    ///
    /// When the annotation recorded an occurrence index and that numbered
    /// occurrence is still present and unclaimed, it is preferred over the
    /// plain first unclaimed occurrence.
    fn match_unscoped(
        &self,
        annotation: &Annotation,
        claims: &mut ClaimSet,
    ) -> Option<ResolvedAnchor> {
        let needle = &annotation.selected_text;
        if needle.is_empty() {
            return None;
        }

        let mut first_free: Option<(usize, CharRange)> = None;
        let mut preferred: Option<(usize, CharRange)> = None;
        let mut ordinal = 0usize;

        for node in self.nodes {
            for range in occurrences_in(&node.text, needle) {
                if claims.is_range_free(node.index, &range) {
                    if first_free.is_none() {
                        first_free = Some((node.index, range));
                    }
                    if annotation.occurrence_index == Some(ordinal) {
                        preferred = Some((node.index, range));
                    }
                }
                ordinal += 1;
            }
        }

        let (node_index, range) = preferred.or(first_free)?;
        claims.claim_range(node_index, range);
        Some(ResolvedAnchor {
            annotation_id: annotation.id.clone(),
            target: AnchorTarget::Inline { node_index, range },
            confidence: AnchorConfidence::Unscoped,
        })
    }

    /// Find the selected text inside a block node, claiming the inner range
    fn narrow_to_selection(
        &self,
        node: &DocNode,
        annotation: &Annotation,
        claims: &mut ClaimSet,
    ) -> Option<CharRange> {
        if annotation.selected_text.is_empty() {
            return None;
        }
        let range = first_free_occurrence(node, &annotation.selected_text, claims)?;
        claims.claim_range(node.index, range);
        Some(range)
    }
}

/// Non-overlapping occurrences of `needle` in `text`, left to right
fn occurrences_in(text: &str, needle: &str) -> Vec<CharRange> {
    let mut out = Vec::new();
    if needle.is_empty() {
        return out;
    }
    let mut from = 0;
    while let Some(rel) = text[from..].find(needle) {
        let start = from + rel;
        let end = start + needle.len();
        out.push(CharRange::new(start, end));
        from = end;
    }
    out
}

/// First occurrence of `needle` in the node's text not yet claimed this pass
fn first_free_occurrence(node: &DocNode, needle: &str, claims: &ClaimSet) -> Option<CharRange> {
    occurrences_in(&node.text, needle)
        .into_iter()
        .find(|range| claims.is_range_free(node.index, range))
}
