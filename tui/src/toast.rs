//! Toast Notices
//!
//! Short-lived messages shown over the current screen, the terminal
//! counterpart of an Android `SHORT` toast.

use std::time::Duration;

use tokio::time::Instant;

/// How long a toast stays visible
pub const TOAST_DURATION: Duration = Duration::from_secs(2);

/// A notice with an expiry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    message: String,
    expires_at: Instant,
}

impl Toast {
    /// Show `message` from `now` for [`TOAST_DURATION`]
    pub fn new(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            expires_at: now + TOAST_DURATION,
        }
    }

    /// Text to show
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the toast should be hidden at `now`
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
