//! Scroll and timer synchronization
//!
//! Maps bidirectionally between document lines and scroll positions in the
//! structured (rendered) view and the raw-text view, for jump-to and
//! live-sync behavior. All timing is modeled as explicit schedule/cancel
//! handles driven by caller-supplied timestamps, so every scheduled action
//! has a deterministic cancellation path and the logic is testable without
//! real timers.
//!
//! ## Modules
//!
//! - `debounce`: debouncer, hover-delay handle, echo-suppression guard
//! - `scroll`: the scroll synchronizer itself

pub mod debounce;
pub mod scroll;

// Re-exports for convenience
pub use debounce::{Debouncer, DelayHandle, EchoGuard};
pub use scroll::{LineProbe, ScrollSynchronizer, SyncCommand, SyncConfig, SyncView};
