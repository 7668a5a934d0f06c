//! Anchor resolution layer
//!
//! Reconciles stored annotations with the node tree produced by the current
//! render pass. The document has no persistent node identity and duplicate
//! text is common, so resolution is layered and deterministic:
//!
//! 1. direct id carry-over from the previous pass,
//! 2. content-hash block match,
//! 3. line-scoped inline search,
//! 4. unscoped inline search over the whole document.
//!
//! ## Architecture
//!
//! This layer is stateless across passes except for the orphan detector's
//! pre-orphan status memory. All claim tracking lives in an explicit
//! [`claims::ClaimSet`] constructed fresh at the start of each pass.
//!
//! ## Modules
//!
//! - `block_id`: content-derived block identifiers
//! - `occurrence`: occurrence counting for repeated selections
//! - `claims`: per-pass claim accumulator
//! - `resolver`: the layered matching strategy
//! - `orphan`: orphan status transitions

pub mod block_id;
pub mod occurrence;
pub mod claims;
pub mod resolver;
pub mod orphan;

// Re-exports for convenience
pub use block_id::identify;
pub use occurrence::occurrence_index;
pub use claims::ClaimSet;
pub use resolver::{AnchorResolver, ResolveConfig};
pub use orphan::OrphanDetector;
