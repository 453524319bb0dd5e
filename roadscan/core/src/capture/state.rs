//! Capture Loop State
//!
//! The loop is a two-state machine driven by timer ticks:
//!
//! ```text
//!          tick && camera ready && Idle
//!   Idle ---------------------------------> Capturing
//!    ^                                          |
//!    +------ response / error / timeout --------+
//! ```
//!
//! [`CaptureLoopState::try_begin`] is the only way into `Capturing`, which
//! keeps at most one classification request in flight.

use serde::{Deserialize, Serialize};

use crate::prediction::CaptureResult;

/// Where the loop is in its cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopPhase {
    /// Waiting for the next tick
    #[default]
    Idle,
    /// A frame is being captured or classified
    Capturing,
    /// The loop has been stopped
    Stopped,
}

/// Readiness and in-flight flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureLoopState {
    /// The camera reported ready on the last poll
    pub camera_ready: bool,
    /// A request is in flight
    pub request_in_flight: bool,
}

impl CaptureLoopState {
    /// Whether a tick may start a capture
    #[must_use]
    pub fn can_capture(&self) -> bool {
        self.camera_ready && !self.request_in_flight
    }

    /// Enter `Capturing` if allowed. Returns whether it did.
    pub fn try_begin(&mut self) -> bool {
        if self.can_capture() {
            self.request_in_flight = true;
            true
        } else {
            false
        }
    }

    /// Return to `Idle` after success or failure
    pub fn finish(&mut self) {
        self.request_in_flight = false;
    }

    /// Phase implied by the flags
    #[must_use]
    pub fn phase(&self) -> LoopPhase {
        if self.request_in_flight {
            LoopPhase::Capturing
        } else {
            LoopPhase::Idle
        }
    }
}

/// Counters for loop activity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Timer ticks seen
    pub ticks: u64,
    /// Captures started
    pub attempts: u64,
    /// Classifications received
    pub successes: u64,
    /// Captures or requests that failed
    pub failures: u64,
    /// Ticks skipped because a request was in flight
    pub skipped_busy: u64,
    /// Ticks skipped because the camera was not ready
    pub skipped_not_ready: u64,
}

/// Observable display state of the Detect screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectSnapshot {
    /// Loop phase
    pub phase: LoopPhase,
    /// Camera readiness from the last poll
    pub camera_ready: bool,
    /// Camera description
    pub source: String,
    /// Most recent classification (superseded by each new one)
    pub last_result: Option<CaptureResult>,
    /// Most recent failure, cleared by the next success
    pub last_error: Option<String>,
    /// Activity counters
    pub stats: CaptureStats,
}

impl DetectSnapshot {
    /// Confidence text for the current result
    #[must_use]
    pub fn confidence_text(&self) -> Option<String> {
        self.last_result
            .as_ref()
            .map(|r| format_confidence(r.confidence))
    }
}

/// Format a confidence as a parenthesised percentage with two decimals.
///
/// `0.97` becomes `"(97.00%)"`. High- and low-confidence results render
/// identically.
#[must_use]
pub fn format_confidence(confidence: f64) -> String {
    format!("({:.2}%)", confidence * 100.0)
}
