//! Highlight injection
//!
//! Walks the node list once per pass and attaches each resolved anchor to
//! its node, producing the pre-computed render structures the view consumes.
//! Every node kind goes through the same normalization as resolution did:
//! plain text spans get segment lists, delimited blocks get whole-block
//! highlight ids plus segments for any narrowed inner range.
//!
//! Composition runs behind a fault boundary: if composing one node fails,
//! that node falls back to its unannotated rendering and the fault is
//! logged, so one bad annotation can never blank the whole view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    AnchorTarget, Annotation, AnnotationKind, DocNode, NodeContent, NodeKind, ResolvedAnchor,
};

use super::segments::{compose_highlights, HighlightMatch, Segment};

/// One node with all highlight information the view needs to render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub node_index: usize,

    pub kind: NodeKind,

    /// Text split into plain/highlighted pieces, in order
    pub segments: Vec<Segment>,

    /// Annotations highlighting this block as a whole (block kinds only)
    #[serde(default)]
    pub block_annotation_ids: Vec<String>,

    /// Every annotation id landing on this node. The view stamps these onto
    /// the rendered element so the next pass can use the direct-id fast path.
    #[serde(default)]
    pub annotation_ids: Vec<String>,
}

/// Attach resolved anchors to their nodes
pub fn inject_highlights(
    nodes: &[DocNode],
    anchors: &[ResolvedAnchor],
    annotations: &[Annotation],
) -> Vec<RenderNode> {
    let kinds: HashMap<&str, AnnotationKind> = annotations
        .iter()
        .map(|a| (a.id.as_str(), a.kind))
        .collect();

    nodes
        .iter()
        .map(|node| match node.content() {
            NodeContent::Block { .. } => render_block_node(node, anchors, &kinds),
            NodeContent::Span(_) => render_span_node(node, anchors, &kinds),
        })
        .collect()
}

/// Dispatch for plain text span nodes (paragraph, heading, list item, quote)
fn render_span_node(
    node: &DocNode,
    anchors: &[ResolvedAnchor],
    kinds: &HashMap<&str, AnnotationKind>,
) -> RenderNode {
    let mut matches = Vec::new();
    let mut annotation_ids = Vec::new();

    for anchor in anchors {
        if let AnchorTarget::Inline { node_index, range } = &anchor.target {
            if *node_index == node.index {
                matches.push(HighlightMatch {
                    range: *range,
                    annotation_id: anchor.annotation_id.clone(),
                    kind: kind_of(kinds, &anchor.annotation_id),
                });
                annotation_ids.push(anchor.annotation_id.clone());
            }
        }
    }

    RenderNode {
        node_index: node.index,
        kind: node.kind,
        segments: compose_or_fallback(node, &matches),
        block_annotation_ids: Vec::new(),
        annotation_ids,
    }
}

/// Dispatch for delimited block nodes (code, table, math)
fn render_block_node(
    node: &DocNode,
    anchors: &[ResolvedAnchor],
    kinds: &HashMap<&str, AnnotationKind>,
) -> RenderNode {
    let mut matches = Vec::new();
    let mut block_annotation_ids = Vec::new();
    let mut annotation_ids = Vec::new();

    for anchor in anchors {
        match &anchor.target {
            AnchorTarget::Block { node_index, inner_range, .. } if *node_index == node.index => {
                block_annotation_ids.push(anchor.annotation_id.clone());
                annotation_ids.push(anchor.annotation_id.clone());
                if let Some(range) = inner_range {
                    matches.push(HighlightMatch {
                        range: *range,
                        annotation_id: anchor.annotation_id.clone(),
                        kind: kind_of(kinds, &anchor.annotation_id),
                    });
                }
            }
            // Inline fallback matches land inside blocks too (the mitigation
            // for block-id hash collisions)
            AnchorTarget::Inline { node_index, range } if *node_index == node.index => {
                matches.push(HighlightMatch {
                    range: *range,
                    annotation_id: anchor.annotation_id.clone(),
                    kind: kind_of(kinds, &anchor.annotation_id),
                });
                annotation_ids.push(anchor.annotation_id.clone());
            }
            _ => {}
        }
    }

    RenderNode {
        node_index: node.index,
        kind: node.kind,
        segments: compose_or_fallback(node, &matches),
        block_annotation_ids,
        annotation_ids,
    }
}

/// The composition fault boundary
///
/// A failed composition substitutes the node's unannotated rendering.
fn compose_or_fallback(node: &DocNode, matches: &[HighlightMatch]) -> Vec<Segment> {
    match compose_highlights(&node.text, matches) {
        Ok(segments) => segments,
        Err(err) => {
            log::error!(
                "highlight composition failed for node {}: {}; rendering unannotated",
                node.index,
                err
            );
            vec![Segment::Plain { text: node.text.clone() }]
        }
    }
}

fn kind_of(kinds: &HashMap<&str, AnnotationKind>, annotation_id: &str) -> AnnotationKind {
    match kinds.get(annotation_id).copied() {
        Some(kind) => kind,
        None => {
            log::warn!(
                "anchor {} has no annotation record; defaulting highlight kind to comment",
                annotation_id
            );
            AnnotationKind::Comment
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnchorConfidence, AnnotationStatus, CharRange};

    fn make_annotation(id: &str, selected: &str) -> Annotation {
        Annotation {
            id: id.to_string(),
            kind: AnnotationKind::Review,
            content: String::new(),
            selected_text: selected.to_string(),
            block_id: None,
            start_line: None,
            end_line: None,
            occurrence_index: None,
            status: AnnotationStatus::Active,
            replies: Vec::new(),
            created_at: "t0".to_string(),
            updated_at: "t0".to_string(),
        }
    }

    fn inline_anchor(id: &str, node_index: usize, start: usize, end: usize) -> ResolvedAnchor {
        ResolvedAnchor {
            annotation_id: id.to_string(),
            target: AnchorTarget::Inline {
                node_index,
                range: CharRange::new(start, end),
            },
            confidence: AnchorConfidence::Unscoped,
        }
    }

    #[test]
    fn test_span_node_gets_highlight_segments() {
        let nodes = vec![DocNode::new(0, NodeKind::Paragraph, "hello world")];
        let anns = vec![make_annotation("a1", "hello")];
        let anchors = vec![inline_anchor("a1", 0, 0, 5)];

        let rendered = inject_highlights(&nodes, &anchors, &anns);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].annotation_ids, vec!["a1".to_string()]);
        assert_eq!(rendered[0].segments.len(), 2);
    }

    #[test]
    fn test_block_node_collects_whole_block_ids() {
        let nodes = vec![DocNode::new(0, NodeKind::Code, "fn main() {}")];
        let anns = vec![make_annotation("a1", "")];
        let anchors = vec![ResolvedAnchor {
            annotation_id: "a1".to_string(),
            target: AnchorTarget::Block {
                block_id: nodes[0].block_id().unwrap(),
                node_index: 0,
                inner_range: None,
            },
            confidence: AnchorConfidence::Exact,
        }];

        let rendered = inject_highlights(&nodes, &anchors, &anns);
        assert_eq!(rendered[0].block_annotation_ids, vec!["a1".to_string()]);
        // Whole-block highlight, no inner span
        assert_eq!(
            rendered[0].segments,
            vec![Segment::Plain { text: "fn main() {}".to_string() }]
        );
    }

    #[test]
    fn test_bad_anchor_falls_back_to_unannotated_node() {
        let nodes = vec![DocNode::new(0, NodeKind::Paragraph, "short")];
        let anns = vec![make_annotation("a1", "x")];
        // Range beyond the node text: composition fails, boundary substitutes
        // the plain rendering
        let anchors = vec![inline_anchor("a1", 0, 0, 400)];

        let rendered = inject_highlights(&nodes, &anchors, &anns);
        assert_eq!(
            rendered[0].segments,
            vec![Segment::Plain { text: "short".to_string() }]
        );
    }

    #[test]
    fn test_dispatch_follows_normalized_content() {
        // Every block kind goes through the block path, every span kind
        // through the span path, driven by node normalization
        let nodes = vec![
            DocNode::new(0, NodeKind::Table, "| a | b |"),
            DocNode::new(1, NodeKind::Blockquote, "quoted words"),
        ];
        let anchors = vec![
            ResolvedAnchor {
                annotation_id: "a1".to_string(),
                target: AnchorTarget::Block {
                    block_id: nodes[0].block_id().unwrap(),
                    node_index: 0,
                    inner_range: None,
                },
                confidence: AnchorConfidence::Exact,
            },
            inline_anchor("a2", 1, 0, 6),
        ];

        let rendered = inject_highlights(&nodes, &anchors, &[]);
        assert_eq!(rendered[0].block_annotation_ids, vec!["a1".to_string()]);
        assert!(rendered[1].block_annotation_ids.is_empty());
        assert!(matches!(rendered[1].segments[0], Segment::Highlighted { .. }));
    }

    #[test]
    fn test_anchor_without_record_defaults_to_comment_kind() {
        let nodes = vec![DocNode::new(0, NodeKind::Paragraph, "stale highlight")];
        // No annotation list entry for this anchor's id
        let rendered = inject_highlights(&nodes, &[inline_anchor("ghost", 0, 0, 5)], &[]);

        match &rendered[0].segments[0] {
            Segment::Highlighted { annotation_kind, .. } => {
                assert_eq!(*annotation_kind, AnnotationKind::Comment);
            }
            other => panic!("expected highlight, got {:?}", other),
        }
    }

    #[test]
    fn test_nodes_without_anchors_render_plain() {
        let nodes = vec![
            DocNode::new(0, NodeKind::Heading, "Title"),
            DocNode::new(1, NodeKind::Paragraph, "body"),
        ];
        let rendered = inject_highlights(&nodes, &[], &[]);
        assert!(rendered.iter().all(|n| n.annotation_ids.is_empty()));
        assert_eq!(rendered[0].segments, vec![Segment::Plain { text: "Title".to_string() }]);
    }
}
