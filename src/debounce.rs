//! Debounce Gate
//!
//! One-shot suppression window armed after a detection, preventing a badge
//! held in view from checking in once per frame. Arm-or-extend semantics:
//! re-arming while suppressed restarts the window (last-arm-wins), and the
//! reset is idempotent, so the gate can never stay closed forever.
//!
//! The gate is owned by a single loop task and checked inline at the top of
//! each tick; there is no background timer. A port that moves expiry onto a
//! separate task must put the gate behind a mutex.

use std::time::Duration;
use tokio::time::Instant;

/// Suppression window state
#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    expires_at: Option<Instant>,
}

impl DebounceGate {
    /// Create an open gate with the given window length
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            expires_at: None,
        }
    }

    /// Arm (or re-arm) the window starting at `now`
    pub fn arm(&mut self, now: Instant) {
        self.expires_at = Some(now + self.window);
    }

    /// Check the gate at `now`, clearing it if the window has elapsed
    ///
    /// Returns `true` when the caller may process a frame. A tick landing
    /// exactly on the expiry instant is open.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) if now >= expires_at => {
                self.expires_at = None;
                true
            }
            Some(_) => false,
        }
    }

    /// Whether the gate is currently suppressing
    pub fn is_suppressed(&self) -> bool {
        self.expires_at.is_some()
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.window
    }
}
