//! Explicit timer handles
//!
//! No ambient timers: every handle is owned by its caller and driven by
//! timestamps the caller supplies (milliseconds, from `performance.now()` on
//! the web side). Scheduling, firing, and cancellation are all explicit
//! method calls, which keeps burst coalescing and echo suppression
//! deterministic under test.

/// Coalesces a burst of events into one deferred firing
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(window_ms: f64) -> Self {
        Self { window_ms, deadline: None }
    }

    /// Start or extend the coalescing window
    pub fn schedule(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.window_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire if the window has elapsed, clearing the schedule
    pub fn fire(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A cancellable one-shot delay (hover cards, link previews)
///
/// Delays exist purely to avoid flicker; callers cancel on a new hover or on
/// unmount.
#[derive(Debug, Clone, Default)]
pub struct DelayHandle {
    fires_at: Option<f64>,
}

impl DelayHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the action `delay_ms` from now, replacing any pending one
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) {
        self.fires_at = Some(now_ms + delay_ms);
    }

    pub fn cancel(&mut self) {
        self.fires_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.fires_at.is_some()
    }

    /// Consume the schedule if its delay has elapsed
    pub fn fire(&mut self, now_ms: f64) -> bool {
        match self.fires_at {
            Some(at) if now_ms >= at => {
                self.fires_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Short cool-down suppressing the echo of a programmatic scroll
///
/// When the synchronizer scrolls a view programmatically, that view emits a
/// scroll event of its own; the guard swallows it instead of letting it
/// bounce back as a mirrored update.
#[derive(Debug, Clone, Default)]
pub struct EchoGuard {
    until: Option<f64>,
}

impl EchoGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the guard for `cooldown_ms` from now
    pub fn arm(&mut self, now_ms: f64, cooldown_ms: f64) {
        self.until = Some(now_ms + cooldown_ms);
    }

    /// Whether an event at `now_ms` should be treated as an echo
    pub fn is_active(&mut self, now_ms: f64) -> bool {
        match self.until {
            Some(until) if now_ms < until => true,
            Some(_) => {
                self.until = None;
                false
            }
            None => false,
        }
    }
}
