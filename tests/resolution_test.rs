// Test anchor resolution across render passes: priority order, occurrence
// disambiguation, the orphan round trip, and generation handling

use marginalia_wasm::anchoring::{occurrence_index, AnchorResolver, ClaimSet, ResolveConfig};
use marginalia_wasm::api::pass::EngineState;
use marginalia_wasm::models::{
    AnchorConfidence, AnchorTarget, Annotation, AnnotationKind, AnnotationStatus, CharRange,
    DocNode, NodeKind,
};

/// Create an inline annotation for testing
fn make_annotation(id: &str, selected: &str) -> Annotation {
    Annotation {
        id: id.to_string(),
        kind: AnnotationKind::Comment,
        content: "a note".to_string(),
        selected_text: selected.to_string(),
        block_id: None,
        start_line: None,
        end_line: None,
        occurrence_index: None,
        status: AnnotationStatus::Active,
        replies: Vec::new(),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

fn make_nodes(specs: &[(NodeKind, &str)]) -> Vec<DocNode> {
    specs
        .iter()
        .enumerate()
        .map(|(i, (kind, text))| DocNode::new(i, *kind, *text))
        .collect()
}

#[test]
fn test_occurrence_stability() {
    // Selecting the second "foo" (offset 8) yields occurrence index 1
    assert_eq!(occurrence_index("foo bar foo baz foo", "foo", 8), 1);
}

#[test]
fn test_resolution_prefers_block_over_inline() {
    let nodes = make_nodes(&[
        (NodeKind::Paragraph, "x * y appears in the prose"),
        (NodeKind::Math, "x * y"),
    ]);
    let block_id = nodes[1].block_id().expect("math node has a block id");

    let mut ann = make_annotation("a1", "x * y");
    ann.block_id = Some(block_id.clone());

    let resolver = AnchorResolver::new(&nodes, ResolveConfig::default());
    let anchors = resolver.resolve_all(std::slice::from_ref(&ann));

    assert_eq!(anchors.len(), 1);
    match &anchors[0].target {
        AnchorTarget::Block { block_id: resolved, node_index, .. } => {
            assert_eq!(resolved, &block_id);
            assert_eq!(*node_index, 1, "must anchor to the block, not the prose");
        }
        other => panic!("expected a block anchor, got {:?}", other),
    }
}

#[test]
fn test_resolve_is_idempotent_across_identical_passes() {
    let nodes = make_nodes(&[
        (NodeKind::Heading, "Overview"),
        (NodeKind::Paragraph, "alpha beta alpha"),
        (NodeKind::Code, "beta()"),
    ]);
    let annotations = vec![
        make_annotation("a1", "alpha"),
        make_annotation("a2", "alpha"),
        make_annotation("a3", "beta"),
    ];

    let resolver = AnchorResolver::new(&nodes, ResolveConfig::default());
    let first = resolver.resolve_all(&annotations);
    let second = resolver.resolve_all(&annotations);
    assert_eq!(first, second, "resolve must be idempotent for identical input");
}

#[test]
fn test_line_tolerance_boundary() {
    let mut ann = make_annotation("a1", "needle");
    ann.start_line = Some(10);
    ann.end_line = Some(10);

    // Content drifted to line 12: still inside the +-2 band
    let nodes = vec![DocNode::new(0, NodeKind::Paragraph, "a needle here").with_source_line(12)];
    let resolver = AnchorResolver::new(&nodes, ResolveConfig::default());
    let mut claims = ClaimSet::new();
    let anchor = resolver.resolve_one(&ann, &mut claims).unwrap();
    assert_eq!(anchor.confidence, AnchorConfidence::LineScoped);

    // Line 13 is outside the band; the fallback scan still finds the text
    // but with unscoped confidence
    let nodes = vec![DocNode::new(0, NodeKind::Paragraph, "a needle here").with_source_line(13)];
    let resolver = AnchorResolver::new(&nodes, ResolveConfig::default());
    let mut claims = ClaimSet::new();
    let anchor = resolver.resolve_one(&ann, &mut claims).unwrap();
    assert_eq!(anchor.confidence, AnchorConfidence::Unscoped);
}

#[test]
fn test_occurrence_index_survives_a_fresh_render() {
    // The annotation targets the second "same" and must stay there on a
    // pass where nothing carries ids over
    let nodes = make_nodes(&[(NodeKind::Paragraph, "same old same old")]);
    let mut ann = make_annotation("a1", "same");
    ann.occurrence_index = Some(1);

    let resolver = AnchorResolver::new(&nodes, ResolveConfig::default());
    let anchors = resolver.resolve_all(std::slice::from_ref(&ann));
    assert_eq!(
        anchors[0].target,
        AnchorTarget::Inline { node_index: 0, range: CharRange::new(9, 13) }
    );
}

#[test]
fn test_orphan_round_trip_restores_user_resolved_status() {
    let text = "the quick brown fox";
    let nodes = make_nodes(&[(NodeKind::Paragraph, text)]);
    let mut state = EngineState::new(text.to_string(), nodes, Vec::new());

    let mut ann = make_annotation("a1", "quick");
    ann.status = AnnotationStatus::Resolved;
    state.add_annotation(ann, Some(4));

    // Pass 1: anchored, status untouched
    let generation = state.generation();
    let result = state.run_pass(generation).unwrap();
    assert_eq!(result.annotations[0].status, AnnotationStatus::Resolved);

    // Edit removes the anchor text entirely
    let edited = "the slow brown fox";
    let generation = state.update_document(
        edited.to_string(),
        vec![DocNode::new(0, NodeKind::Paragraph, edited)],
    );
    let result = state.run_pass(generation).unwrap();
    assert_eq!(result.annotations[0].status, AnnotationStatus::Orphaned);

    // Undo restores the text: the annotation returns to its pre-orphan
    // user-resolved state, not to active
    let generation = state.update_document(
        text.to_string(),
        vec![DocNode::new(0, NodeKind::Paragraph, text)],
    );
    let result = state.run_pass(generation).unwrap();
    assert_eq!(result.annotations[0].status, AnnotationStatus::Resolved);
}

#[test]
fn test_malformed_annotation_never_blocks_the_pass() {
    let text = "healthy text";
    let nodes = make_nodes(&[(NodeKind::Paragraph, text)]);
    let mut state = EngineState::new(text.to_string(), nodes, Vec::new());

    state.add_annotation(make_annotation("bad", ""), None);
    state.add_annotation(make_annotation("good", "healthy"), Some(0));

    let generation = state.generation();
    let result = state.run_pass(generation).unwrap();

    // The malformed record resolves nothing but keeps its status; the good
    // one anchors normally
    assert_eq!(result.anchors.len(), 1);
    assert_eq!(result.anchors[0].annotation_id, "good");
    assert_eq!(result.annotations[0].status, AnnotationStatus::Active);
}

#[test]
fn test_superseded_pass_is_discarded() {
    let nodes = make_nodes(&[(NodeKind::Paragraph, "v1")]);
    let mut state = EngineState::new("v1".to_string(), nodes, Vec::new());

    let stale = state.generation();
    let fresh = state.update_document(
        "v2".to_string(),
        vec![DocNode::new(0, NodeKind::Paragraph, "v2")],
    );

    assert!(state.run_pass(stale).is_err(), "stale pass must be rejected");
    assert!(state.run_pass(fresh).is_ok());
}
