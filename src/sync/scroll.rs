//! Scroll synchronization between the structured and raw-text views
//!
//! Both views report line probes: the vertical offsets of their line-tagged
//! elements, refreshed after each render pass. Mapping a scroll position to a
//! line picks the probe closest to, but not before, the viewport top; the
//! inverse picks the probe for the nearest line at or after the requested
//! one.
//!
//! Live sync is driven by `on_scroll`/`poll`: scroll bursts are debounced
//! (~100ms coalescing) and each programmatic scroll arms an echo guard on
//! the target view so the mirrored update it triggers is swallowed.

use serde::{Deserialize, Serialize};

use super::debounce::{Debouncer, EchoGuard};

/// Which of the two synchronized views an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncView {
    /// The rendered document tree
    Structured,

    /// The raw source text editor
    Raw,
}

impl SyncView {
    pub fn other(&self) -> SyncView {
        match self {
            SyncView::Structured => SyncView::Raw,
            SyncView::Raw => SyncView::Structured,
        }
    }
}

/// Tunable timing windows, all in milliseconds
///
/// Empirically chosen values; configuration, not contract.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Scroll burst coalescing window
    pub debounce_ms: f64,

    /// How long a programmatic scroll suppresses the echo it triggers
    pub echo_cooldown_ms: f64,

    /// Hover-card delay (avoids flicker on quick mouse passes)
    pub hover_delay_ms: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100.0,
            echo_cooldown_ms: 150.0,
            hover_delay_ms: 200.0,
        }
    }
}

/// One line-tagged element's position within a view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProbe {
    /// 1-based source line
    pub line: usize,

    /// Vertical offset of the element from the top of the view, in pixels
    pub top: f64,
}

/// A programmatic scroll the caller must perform on the other view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCommand {
    pub target: SyncView,
    pub scroll_top: f64,
    pub line: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingScroll {
    view: SyncView,
    scroll_top: f64,
}

/// Bidirectional line <-> scroll mapping with live-sync debouncing
#[derive(Debug)]
pub struct ScrollSynchronizer {
    config: SyncConfig,
    structured_probes: Vec<LineProbe>,
    raw_probes: Vec<LineProbe>,
    debouncer: Debouncer,
    pending: Option<PendingScroll>,
    structured_echo: EchoGuard,
    raw_echo: EchoGuard,
}

impl ScrollSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            structured_probes: Vec::new(),
            raw_probes: Vec::new(),
            debouncer: Debouncer::new(config.debounce_ms),
            pending: None,
            structured_echo: EchoGuard::new(),
            raw_echo: EchoGuard::new(),
        }
    }

    /// Replace a view's line probes (after a render pass or editor reflow)
    pub fn set_probes(&mut self, view: SyncView, mut probes: Vec<LineProbe>) {
        probes.sort_by(|a, b| a.top.total_cmp(&b.top));
        match view {
            SyncView::Structured => self.structured_probes = probes,
            SyncView::Raw => self.raw_probes = probes,
        }
    }

    fn probes(&self, view: SyncView) -> &[LineProbe] {
        match view {
            SyncView::Structured => &self.structured_probes,
            SyncView::Raw => &self.raw_probes,
        }
    }

    /// The line whose element is closest to, but not before, the viewport top
    pub fn line_for_scroll(&self, view: SyncView, scroll_top: f64) -> Option<usize> {
        self.probes(view)
            .iter()
            .find(|probe| probe.top >= scroll_top)
            .map(|probe| probe.line)
    }

    /// The scroll position that brings `line` to the viewport top
    ///
    /// When the exact line has no probe (it may sit inside a larger node),
    /// the nearest probed line at or after it is used; past the last probe
    /// the view scrolls to its final probe.
    pub fn scroll_for_line(&self, view: SyncView, line: usize) -> Option<f64> {
        let probes = self.probes(view);
        probes
            .iter()
            .find(|probe| probe.line >= line)
            .or_else(|| probes.last())
            .map(|probe| probe.top)
    }

    /// Record a user scroll in `view`
    ///
    /// Returns `false` when the event was swallowed as the echo of a
    /// programmatic scroll this synchronizer issued.
    pub fn on_scroll(&mut self, view: SyncView, scroll_top: f64, now_ms: f64) -> bool {
        let echo = match view {
            SyncView::Structured => &mut self.structured_echo,
            SyncView::Raw => &mut self.raw_echo,
        };
        if echo.is_active(now_ms) {
            return false;
        }

        self.pending = Some(PendingScroll { view, scroll_top });
        self.debouncer.schedule(now_ms);
        true
    }

    /// Drive the debounce window; emits the mirrored scroll once it elapses
    ///
    /// The caller invokes this from its frame loop (or a timer) and performs
    /// the returned command. The target view's echo guard is armed before the
    /// command is returned, so the echo cannot re-trigger a sync.
    pub fn poll(&mut self, now_ms: f64) -> Option<SyncCommand> {
        if !self.debouncer.fire(now_ms) {
            return None;
        }
        let pending = self.pending.take()?;

        // A scroll past the last probe still mirrors: clamp to the final
        // probed line, matching scroll_for_line's end-of-view behavior
        let line = self
            .line_for_scroll(pending.view, pending.scroll_top)
            .or_else(|| self.probes(pending.view).last().map(|probe| probe.line))?;
        let target = pending.view.other();
        let scroll_top = self.scroll_for_line(target, line)?;

        match target {
            SyncView::Structured => self.structured_echo.arm(now_ms, self.config.echo_cooldown_ms),
            SyncView::Raw => self.raw_echo.arm(now_ms, self.config.echo_cooldown_ms),
        }

        Some(SyncCommand { target, scroll_top, line })
    }
}
