// Test highlight composition: overlap resolution, the partition guarantee,
// and the composition fault boundary

use marginalia_wasm::models::{AnnotationKind, CharRange, DocNode, NodeKind};
use marginalia_wasm::render::inject::inject_highlights;
use marginalia_wasm::render::segments::{compose_highlights, HighlightMatch, Segment};
use marginalia_wasm::models::{AnchorConfidence, AnchorTarget, ResolvedAnchor};

fn make_match(start: usize, end: usize, id: &str) -> HighlightMatch {
    HighlightMatch {
        range: CharRange::new(start, end),
        annotation_id: id.to_string(),
        kind: AnnotationKind::Comment,
    }
}

#[test]
fn test_overlap_partition() {
    // "hello" (0-5) wins; the later-starting "lo wo" (3-8) is dropped
    // entirely, never split or merged
    let segments = compose_highlights(
        "hello world",
        &[make_match(0, 5, "a1"), make_match(3, 8, "a2")],
    )
    .unwrap();

    assert_eq!(
        segments,
        vec![
            Segment::Highlighted {
                text: "hello".to_string(),
                annotation_id: "a1".to_string(),
                annotation_kind: AnnotationKind::Comment,
            },
            Segment::Plain { text: " world".to_string() },
        ]
    );
}

#[test]
fn test_segments_always_partition_the_text_exactly_once() {
    let text = "lorem ipsum dolor sit amet";
    let cases: Vec<Vec<HighlightMatch>> = vec![
        vec![],
        vec![make_match(0, 5, "a")],
        vec![make_match(6, 11, "a"), make_match(18, 21, "b")],
        vec![make_match(0, 11, "a"), make_match(6, 17, "b"), make_match(11, 17, "c")],
    ];

    for matches in cases {
        let segments = compose_highlights(text, &matches).unwrap();
        let rebuilt: String = segments.iter().map(|s| s.text()).collect();
        assert_eq!(rebuilt, text, "segments must concatenate back to the input");
    }
}

#[test]
fn test_dropped_overlap_is_a_display_decision_only() {
    // Both annotations anchored to overlapping ranges in the same node. The
    // compositor keeps the first; the second disappears from this node's
    // segments but keeps its anchor (and is therefore never orphaned).
    let nodes = vec![DocNode::new(0, NodeKind::Paragraph, "hello world")];
    let anchors = vec![
        ResolvedAnchor {
            annotation_id: "a1".to_string(),
            target: AnchorTarget::Inline { node_index: 0, range: CharRange::new(0, 5) },
            confidence: AnchorConfidence::Unscoped,
        },
        ResolvedAnchor {
            annotation_id: "a2".to_string(),
            target: AnchorTarget::Inline { node_index: 0, range: CharRange::new(3, 8) },
            confidence: AnchorConfidence::Unscoped,
        },
    ];

    let rendered = inject_highlights(&nodes, &anchors, &[]);
    let highlighted: Vec<&str> = rendered[0]
        .segments
        .iter()
        .filter_map(|s| match s {
            Segment::Highlighted { annotation_id, .. } => Some(annotation_id.as_str()),
            Segment::Plain { .. } => None,
        })
        .collect();

    assert_eq!(highlighted, vec!["a1"]);
    // Both ids are still stamped onto the node for the next pass
    assert_eq!(rendered[0].annotation_ids, vec!["a1".to_string(), "a2".to_string()]);
}

#[test]
fn test_fault_boundary_substitutes_unannotated_rendering() {
    let nodes = vec![
        DocNode::new(0, NodeKind::Paragraph, "fine"),
        DocNode::new(1, NodeKind::Paragraph, "broken"),
    ];
    let anchors = vec![
        ResolvedAnchor {
            annotation_id: "ok".to_string(),
            target: AnchorTarget::Inline { node_index: 0, range: CharRange::new(0, 4) },
            confidence: AnchorConfidence::Unscoped,
        },
        // Out-of-bounds range: composing node 1 fails
        ResolvedAnchor {
            annotation_id: "bad".to_string(),
            target: AnchorTarget::Inline { node_index: 1, range: CharRange::new(2, 9999) },
            confidence: AnchorConfidence::Unscoped,
        },
    ];

    let rendered = inject_highlights(&nodes, &anchors, &[]);

    // One bad annotation must not blank the view: node 0 renders its
    // highlight, node 1 falls back to plain text
    assert!(matches!(rendered[0].segments[0], Segment::Highlighted { .. }));
    assert_eq!(
        rendered[1].segments,
        vec![Segment::Plain { text: "broken".to_string() }]
    );
}
