//! Models module for the Marginalia annotation engine
//!
//! This module contains the persistent annotation records, the externally
//! produced document node structures, and the render-pass-scoped anchor
//! types used throughout the engine.

pub mod annotation;
pub mod node;
pub mod anchor;

// Re-export commonly used types
pub use annotation::*;
pub use node::*;
pub use anchor::*;
