//! Marginalia Annotation Engine WASM API
//!
//! This module provides the JavaScript-facing API for the annotation engine.
//! It includes shared utilities for serialization, validation, and error
//! handling, as well as the engine entry points organized by functional
//! domain.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, validation, error handling, and logging
//! - `pass`: Document loading, render-pass execution, and between-pass annotation mutations
//! - `scroll`: Scroll synchronization and hover-delay handles

pub mod helpers;
pub mod pass;
pub mod scroll;

// Re-export all public functions from modules to keep the public API flat
pub use pass::*;
pub use scroll::*;
