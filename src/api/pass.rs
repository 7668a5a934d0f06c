//! Render-pass execution and annotation maintenance
//!
//! The engine owns one document's state inside the WASM module (canonical
//! source of truth, mirroring the editing surface). Each call sequence is:
//! load or update the document, then run a pass; the pass resolves anchors,
//! injects highlights, and applies orphan transitions synchronously, in that
//! order, before returning.
//!
//! Passes are guarded by a generation counter: `update_document` bumps it,
//! and a `run_pass` for an older generation is rejected outright so a
//! superseded pass can never merge partial results. Annotation mutations
//! (add, edit, reply, status, delete) happen strictly between passes.

use std::collections::HashSet;
use std::sync::Mutex;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::anchoring::{occurrence_index, AnchorResolver, OrphanDetector, ResolveConfig};
use crate::models::{Annotation, DocNode, ResolvedAnchor};
use crate::render::{inject_highlights, RenderNode};

use super::helpers::{
    annotation_status_from_str, deserialize, serialize, validate_selection_range, validation_error,
};
use crate::{wasm_error, wasm_info, wasm_log, wasm_warn};

// WASM-owned engine state (canonical source of truth)
lazy_static! {
    static ref ENGINE: Mutex<Option<EngineState>> = Mutex::new(None);
}

/// Everything one pass hands back to the view layer
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PassResult {
    pub generation: u32,

    /// The annotation records, with `status` possibly updated
    pub annotations: Vec<Annotation>,

    /// Transient resolved anchors (never persisted)
    pub anchors: Vec<ResolvedAnchor>,

    /// Per-node segments and highlight ids for rendering
    pub nodes: Vec<RenderNode>,
}

/// A pass-level failure surfaced to the caller
#[derive(Debug, Error, PartialEq)]
pub enum PassError {
    #[error("pass for generation {requested} superseded by generation {current}")]
    StaleGeneration { requested: u32, current: u32 },

    #[error("unknown annotation id: {0}")]
    UnknownAnnotation(String),
}

/// One open document's engine state
///
/// Single-threaded and cooperative: a pass runs to completion before the
/// next starts, and annotation mutations are applied only between passes.
pub struct EngineState {
    document_text: String,
    nodes: Vec<DocNode>,
    annotations: Vec<Annotation>,
    generation: u32,
    config: ResolveConfig,
    orphans: OrphanDetector,
    last_anchors: Vec<ResolvedAnchor>,
}

impl EngineState {
    pub fn new(document_text: String, nodes: Vec<DocNode>, annotations: Vec<Annotation>) -> Self {
        Self {
            document_text,
            nodes,
            annotations,
            generation: 0,
            config: ResolveConfig::default(),
            orphans: OrphanDetector::new(),
            last_anchors: Vec::new(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Byte length of the current document text
    pub fn document_len(&self) -> usize {
        self.document_text.len()
    }

    pub fn set_config(&mut self, config: ResolveConfig) {
        self.config = config;
    }

    /// Swap in a newer document state, superseding any in-flight pass
    pub fn update_document(&mut self, document_text: String, nodes: Vec<DocNode>) -> u32 {
        self.document_text = document_text;
        self.nodes = nodes;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Run one full pass: resolve, inject, classify
    pub fn run_pass(&mut self, generation: u32) -> Result<PassResult, PassError> {
        if generation != self.generation {
            // Superseded: discard wholesale, never merge partial results
            return Err(PassError::StaleGeneration {
                requested: generation,
                current: self.generation,
            });
        }

        let resolver = AnchorResolver::new(&self.nodes, self.config);
        let anchors = resolver.resolve_all(&self.annotations);
        let nodes = inject_highlights(&self.nodes, &anchors, &self.annotations);

        let resolved_ids: HashSet<&str> =
            anchors.iter().map(|a| a.annotation_id.as_str()).collect();
        for annotation in &mut self.annotations {
            // Malformed records were skipped during resolution, not orphaned
            if !annotation.is_well_formed() {
                continue;
            }
            self.orphans
                .classify(annotation, resolved_ids.contains(annotation.id.as_str()));
        }

        self.last_anchors = anchors.clone();

        Ok(PassResult {
            generation: self.generation,
            annotations: self.annotations.clone(),
            anchors,
            nodes,
        })
    }

    /// Add a new annotation, deriving its occurrence index from the raw
    /// selection offset when it is an inline annotation
    pub fn add_annotation(&mut self, mut annotation: Annotation, selection_start: Option<usize>) {
        if !annotation.is_block() && !annotation.selected_text.is_empty() {
            if let Some(start) = selection_start {
                annotation.occurrence_index = Some(occurrence_index(
                    &self.document_text,
                    &annotation.selected_text,
                    start,
                ));
            }
        }
        self.annotations.push(annotation);
    }

    pub fn annotation_mut(&mut self, id: &str) -> Result<&mut Annotation, PassError> {
        self.annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PassError::UnknownAnnotation(id.to_string()))
    }

    /// Remove an annotation entirely (explicit delete, not orphaning)
    pub fn delete_annotation(&mut self, id: &str) -> Result<(), PassError> {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        if self.annotations.len() == before {
            return Err(PassError::UnknownAnnotation(id.to_string()));
        }
        self.orphans.forget(id);
        Ok(())
    }

    /// The anchor the last pass resolved for an annotation, if any
    pub fn anchor_for(&self, id: &str) -> Option<&ResolvedAnchor> {
        self.last_anchors.iter().find(|a| a.annotation_id == id)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

// ============================================================================
// JavaScript-facing functions
// ============================================================================

fn with_engine<T>(f: impl FnOnce(&mut EngineState) -> Result<T, JsValue>) -> Result<T, JsValue> {
    let mut guard = ENGINE
        .lock()
        .map_err(|_| validation_error("engine state lock poisoned"))?;
    let state = guard
        .as_mut()
        .ok_or_else(|| validation_error("no document loaded"))?;
    f(state)
}

/// Load a document and its stored annotations, replacing any previous state
///
/// Returns the initial generation number.
#[wasm_bindgen(js_name = loadDocument)]
pub fn load_document(
    document_text: String,
    nodes_js: JsValue,
    annotations_js: JsValue,
) -> Result<u32, JsValue> {
    let nodes: Vec<DocNode> = deserialize(nodes_js, "Node list deserialization error")?;
    let annotations: Vec<Annotation> =
        deserialize(annotations_js, "Annotation list deserialization error")?;

    wasm_info!(
        "loadDocument: {} nodes, {} annotations",
        nodes.len(),
        annotations.len()
    );

    let state = EngineState::new(document_text, nodes, annotations);
    let generation = state.generation();
    let mut guard = ENGINE
        .lock()
        .map_err(|_| validation_error("engine state lock poisoned"))?;
    *guard = Some(state);
    Ok(generation)
}

/// Replace the document text and node tree after an edit
///
/// Returns the new generation; any pass still running against an older
/// generation will be rejected when it reports back.
#[wasm_bindgen(js_name = updateDocument)]
pub fn update_document(document_text: String, nodes_js: JsValue) -> Result<u32, JsValue> {
    let nodes: Vec<DocNode> = deserialize(nodes_js, "Node list deserialization error")?;
    with_engine(|state| Ok(state.update_document(document_text, nodes)))
}

/// Run one render pass for the given generation
#[wasm_bindgen(js_name = runPass)]
pub fn run_pass(generation: u32) -> Result<JsValue, JsValue> {
    let result = with_engine(|state| {
        state.run_pass(generation).map_err(|e| {
            wasm_error!("runPass rejected: {}", e);
            JsValue::from_str(&e.to_string())
        })
    })?;
    for annotation in &result.annotations {
        if !annotation.is_well_formed() {
            wasm_warn!(
                "annotation {} skipped this pass: no block id and no selected text",
                annotation.id
            );
        }
    }
    wasm_log!(
        "runPass gen {}: {} anchors, {} annotations",
        result.generation,
        result.anchors.len(),
        result.annotations.len()
    );
    serialize(&result, "Pass result serialization error")
}

/// Add a new annotation (between passes)
///
/// `selection_start` is the raw byte offset where the user's selection began
/// in the full document text; it is used to derive the occurrence index for
/// inline annotations and ignored for block annotations.
#[wasm_bindgen(js_name = addAnnotation)]
pub fn add_annotation(annotation_js: JsValue, selection_start: Option<usize>) -> Result<(), JsValue> {
    let annotation: Annotation = deserialize(annotation_js, "Annotation deserialization error")?;
    if !annotation.is_well_formed() {
        return Err(validation_error(format!(
            "Annotation {} has neither block id nor selected text",
            annotation.id
        )));
    }
    with_engine(|state| {
        if !annotation.is_block() {
            if let Some(start) = selection_start {
                let end = start + annotation.selected_text.len();
                validate_selection_range(start, end, state.document_len())
                    .map_err(validation_error)?;
            }
        }
        state.add_annotation(annotation, selection_start);
        Ok(())
    })
}

/// Edit an annotation's content
#[wasm_bindgen(js_name = updateAnnotationContent)]
pub fn update_annotation_content(
    id: String,
    content: String,
    updated_at: String,
) -> Result<(), JsValue> {
    with_engine(|state| {
        let annotation = state
            .annotation_mut(&id)
            .map_err(|e| validation_error(e.to_string()))?;
        annotation.content = content;
        annotation.updated_at = updated_at;
        Ok(())
    })
}

/// Append a reply to an annotation's thread
#[wasm_bindgen(js_name = addReply)]
pub fn add_reply(id: String, reply_js: JsValue) -> Result<(), JsValue> {
    let reply = deserialize(reply_js, "Reply deserialization error")?;
    with_engine(|state| {
        let annotation = state
            .annotation_mut(&id)
            .map_err(|e| validation_error(e.to_string()))?;
        annotation.add_reply(reply);
        Ok(())
    })
}

/// Set an annotation's status (user resolve/reactivate)
#[wasm_bindgen(js_name = setAnnotationStatus)]
pub fn set_annotation_status(id: String, status: String, updated_at: String) -> Result<(), JsValue> {
    let status = annotation_status_from_str(&status).map_err(validation_error)?;
    with_engine(|state| {
        let annotation = state
            .annotation_mut(&id)
            .map_err(|e| validation_error(e.to_string()))?;
        annotation.status = status;
        annotation.updated_at = updated_at;
        Ok(())
    })
}

/// Delete an annotation
#[wasm_bindgen(js_name = deleteAnnotation)]
pub fn delete_annotation(id: String) -> Result<(), JsValue> {
    with_engine(|state| {
        state
            .delete_annotation(&id)
            .map_err(|e| validation_error(e.to_string()))
    })
}

/// Look up the anchor the last pass resolved for an annotation
/// (jump-to-annotation navigation). Returns `null` when unresolved.
#[wasm_bindgen(js_name = anchorForAnnotation)]
pub fn anchor_for_annotation(id: String) -> Result<JsValue, JsValue> {
    with_engine(|state| match state.anchor_for(&id) {
        Some(anchor) => serialize(anchor, "Anchor serialization error"),
        None => Ok(JsValue::NULL),
    })
}

/// Override the resolution tunables
#[wasm_bindgen(js_name = setResolveConfig)]
pub fn set_resolve_config(config_js: JsValue) -> Result<(), JsValue> {
    let config: ResolveConfig = deserialize(config_js, "Resolve config deserialization error")?;
    with_engine(|state| {
        state.set_config(config);
        Ok(())
    })
}

/// Debug snapshot of the engine-held annotation list as JSON
#[wasm_bindgen(js_name = engineStateJson)]
pub fn engine_state_json() -> Result<String, JsValue> {
    with_engine(|state| {
        serde_json::to_string_pretty(state.annotations())
            .map_err(|e| validation_error(format!("Snapshot serialization error: {}", e)))
    })
}
