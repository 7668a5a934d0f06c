//! Orphan status transitions
//!
//! An annotation whose anchor text cannot be located anywhere in the current
//! document becomes `orphaned`. Orphaning is a status transition, never a
//! deletion: orphaned annotations stay visible for manual relinking or
//! removal and never block rendering.

use std::collections::HashMap;

use crate::models::{Annotation, AnnotationStatus};

/// Flags annotations as orphaned and restores them when their anchor returns
///
/// Remembers the status each annotation had before it was orphaned, so a
/// user-resolved annotation whose text reappears goes back to `resolved`
/// rather than silently reactivating.
#[derive(Debug, Default)]
pub struct OrphanDetector {
    pre_orphan_status: HashMap<String, AnnotationStatus>,
}

impl OrphanDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the orphan transition for one annotation after a full pass
    ///
    /// `was_resolved` is whether the resolver produced an anchor for it this
    /// pass, after the full-document fallback scan.
    pub fn classify(&mut self, annotation: &mut Annotation, was_resolved: bool) {
        if was_resolved {
            if annotation.status == AnnotationStatus::Orphaned {
                let restored = self
                    .pre_orphan_status
                    .remove(&annotation.id)
                    .unwrap_or(AnnotationStatus::Active);
                log::debug!(
                    "annotation {} re-anchored, restoring status {:?}",
                    annotation.id,
                    restored
                );
                annotation.status = restored;
            }
        } else if annotation.status != AnnotationStatus::Orphaned {
            self.pre_orphan_status
                .insert(annotation.id.clone(), annotation.status);
            annotation.status = AnnotationStatus::Orphaned;
            log::debug!("annotation {} orphaned: no anchor found", annotation.id);
        }
    }

    /// Drop the memory for a deleted annotation
    pub fn forget(&mut self, annotation_id: &str) {
        self.pre_orphan_status.remove(annotation_id);
    }
}
