//! Marginalia Annotation Engine WASM Module
//!
//! This is the main WASM module for the Marginalia document annotation engine.
//! It anchors typed notes (comments, reviews, discussions) to spans of text or
//! structural blocks inside a document that is re-parsed into a fresh node
//! tree on every edit, and reconciles those anchors across render passes.

pub mod models;
pub mod anchoring;
pub mod render;
pub mod sync;
pub mod api;

// Re-export commonly used types
pub use models::annotation::*;
pub use models::node::*;
pub use models::anchor::*;
pub use anchoring::resolver::{AnchorResolver, ResolveConfig};
pub use render::segments::{compose_highlights, HighlightMatch, Segment};
pub use sync::scroll::{ScrollSynchronizer, SyncConfig, SyncView};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Marginalia annotation engine WASM module initialized");
}
