//! Scroll synchronization and hover-delay API
//!
//! Thin JavaScript-facing wrapper around [`ScrollSynchronizer`]. The view
//! layer reports scroll events and line probes with timestamps from
//! `performance.now()`, polls for mirrored-scroll commands from its frame
//! loop, and performs the returned scrolls itself.

use std::sync::Mutex;

use lazy_static::lazy_static;
use wasm_bindgen::prelude::*;

use crate::sync::{DelayHandle, LineProbe, ScrollSynchronizer, SyncConfig};

use super::helpers::{deserialize, serialize, sync_view_from_str, validation_error};

lazy_static! {
    static ref SYNC: Mutex<ScrollSynchronizer> =
        Mutex::new(ScrollSynchronizer::new(SyncConfig::default()));
    static ref HOVER: Mutex<DelayHandle> = Mutex::new(DelayHandle::new());
    static ref HOVER_CONFIG: Mutex<SyncConfig> = Mutex::new(SyncConfig::default());
}

/// Reset the synchronizer with new timing configuration
#[wasm_bindgen(js_name = initScrollSync)]
pub fn init_scroll_sync(config_js: JsValue) -> Result<(), JsValue> {
    let config: SyncConfig = deserialize(config_js, "Sync config deserialization error")?;
    let mut sync = SYNC
        .lock()
        .map_err(|_| validation_error("scroll sync lock poisoned"))?;
    *sync = ScrollSynchronizer::new(config);
    let mut hover_config = HOVER_CONFIG
        .lock()
        .map_err(|_| validation_error("hover config lock poisoned"))?;
    *hover_config = config;
    Ok(())
}

/// Replace a view's line probes after a render pass or editor reflow
#[wasm_bindgen(js_name = setLineProbes)]
pub fn set_line_probes(view: String, probes_js: JsValue) -> Result<(), JsValue> {
    let view = sync_view_from_str(&view).map_err(validation_error)?;
    let probes: Vec<LineProbe> = deserialize(probes_js, "Line probe deserialization error")?;
    let mut sync = SYNC
        .lock()
        .map_err(|_| validation_error("scroll sync lock poisoned"))?;
    sync.set_probes(view, probes);
    Ok(())
}

/// Report a scroll event from one view
///
/// Returns `false` when the event was swallowed as the echo of a
/// programmatic scroll.
#[wasm_bindgen(js_name = onScroll)]
pub fn on_scroll(view: String, scroll_top: f64, now_ms: f64) -> Result<bool, JsValue> {
    let view = sync_view_from_str(&view).map_err(validation_error)?;
    let mut sync = SYNC
        .lock()
        .map_err(|_| validation_error("scroll sync lock poisoned"))?;
    Ok(sync.on_scroll(view, scroll_top, now_ms))
}

/// Poll for a pending mirrored-scroll command; `null` while the debounce
/// window is still open or no scroll is pending
#[wasm_bindgen(js_name = pollScroll)]
pub fn poll_scroll(now_ms: f64) -> Result<JsValue, JsValue> {
    let mut sync = SYNC
        .lock()
        .map_err(|_| validation_error("scroll sync lock poisoned"))?;
    match sync.poll(now_ms) {
        Some(command) => serialize(&command, "Sync command serialization error"),
        None => Ok(JsValue::NULL),
    }
}

/// Map a scroll position to the nearest following document line (jump-to)
#[wasm_bindgen(js_name = lineForScroll)]
pub fn line_for_scroll(view: String, scroll_top: f64) -> Result<Option<usize>, JsValue> {
    let view = sync_view_from_str(&view).map_err(validation_error)?;
    let sync = SYNC
        .lock()
        .map_err(|_| validation_error("scroll sync lock poisoned"))?;
    Ok(sync.line_for_scroll(view, scroll_top))
}

/// Map a document line to a scroll position in the given view (jump-to)
#[wasm_bindgen(js_name = scrollForLine)]
pub fn scroll_for_line(view: String, line: usize) -> Result<Option<f64>, JsValue> {
    let view = sync_view_from_str(&view).map_err(validation_error)?;
    let sync = SYNC
        .lock()
        .map_err(|_| validation_error("scroll sync lock poisoned"))?;
    Ok(sync.scroll_for_line(view, line))
}

/// Schedule the hover card for the annotation under the pointer
///
/// Replaces any pending hover schedule (a new hover cancels the old one).
#[wasm_bindgen(js_name = scheduleHover)]
pub fn schedule_hover(now_ms: f64) -> Result<(), JsValue> {
    let delay = HOVER_CONFIG
        .lock()
        .map_err(|_| validation_error("hover config lock poisoned"))?
        .hover_delay_ms;
    let mut hover = HOVER
        .lock()
        .map_err(|_| validation_error("hover lock poisoned"))?;
    hover.schedule(now_ms, delay);
    Ok(())
}

/// Cancel the pending hover card (pointer left, or component unmounted)
#[wasm_bindgen(js_name = cancelHover)]
pub fn cancel_hover() -> Result<(), JsValue> {
    let mut hover = HOVER
        .lock()
        .map_err(|_| validation_error("hover lock poisoned"))?;
    hover.cancel();
    Ok(())
}

/// Whether the hover delay has elapsed; consumes the schedule when it has
#[wasm_bindgen(js_name = pollHover)]
pub fn poll_hover(now_ms: f64) -> Result<bool, JsValue> {
    let mut hover = HOVER
        .lock()
        .map_err(|_| validation_error("hover lock poisoned"))?;
    Ok(hover.fire(now_ms))
}
