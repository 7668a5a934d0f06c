//! Render layer
//!
//! Turns resolved anchors into the per-node segment lists the JavaScript
//! view renders as DOM spans. All positions and classes are pre-computed
//! here; the view applies them without further layout logic.
//!
//! ## Modules
//!
//! - `segments`: overlap-resolving highlight composition for one text node
//! - `inject`: per-node-kind dispatch and the composition fault boundary

pub mod segments;
pub mod inject;

// Re-exports for convenience
pub use segments::{compose_highlights, ComposeError, HighlightMatch, Segment};
pub use inject::{inject_highlights, RenderNode};
