//! Detector Session
//!
//! Drives one signed-in capture session for the daemon: authenticate, mount
//! the capture loop, report every change, and unmount when told to stop or
//! when the session ends.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use roadscan_core::{
    auth_notice, AuthOperation, CaptureLoop, DetectSnapshot, IdentityClient, Session,
};

/// How often the session token is checked for expiry
const EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Something worth reporting between two snapshots
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// Camera readiness flipped
    CameraReady(bool),
    /// A new classification arrived
    Classified {
        /// Classification label
        label: String,
        /// Formatted confidence, e.g. `(97.00%)`
        confidence: String,
    },
    /// A capture or request failed
    Failed(String),
}

/// Compare two snapshots
pub fn changes(prev: &DetectSnapshot, next: &DetectSnapshot) -> Vec<Change> {
    let mut out = Vec::new();

    if prev.camera_ready != next.camera_ready {
        out.push(Change::CameraReady(next.camera_ready));
    }
    if next.stats.successes > prev.stats.successes {
        if let Some(result) = &next.last_result {
            out.push(Change::Classified {
                label: result.label.clone(),
                confidence: roadscan_core::format_confidence(result.confidence),
            });
        }
    }
    if next.stats.failures > prev.stats.failures {
        if let Some(error) = &next.last_error {
            out.push(Change::Failed(error.clone()));
        }
    }
    out
}

fn report(change: &Change) {
    match change {
        Change::CameraReady(true) => info!("Camera ready"),
        Change::CameraReady(false) => info!("Camera not ready, waiting for frames"),
        Change::Classified { label, confidence } => info!(%label, %confidence, "Classified frame"),
        // The loop already logged the failure at warn
        Change::Failed(error) => debug!(%error, "Capture failed"),
    }
}

/// Sign in, or create the account first when `register` is set
pub async fn authenticate(
    identity: &IdentityClient,
    email: &str,
    password: &str,
    register: bool,
) -> Result<Session> {
    let (operation, result) = if register {
        (AuthOperation::Register, identity.register(email, password).await)
    } else {
        (AuthOperation::SignIn, identity.sign_in(email, password).await)
    };

    result.map_err(|e| anyhow!("{} ({e})", auth_notice(operation, &e)))
}

/// Why a detector session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown future resolved
    Shutdown,
    /// The session was signed out or expired
    SessionEnded,
    /// The capture loop exited on its own
    LoopExited,
}

/// Run the capture loop until `shutdown` resolves or the session ends.
///
/// Returns the reason and the final snapshot.
pub async fn run_until<F>(
    identity: &IdentityClient,
    capture: CaptureLoop,
    shutdown: F,
) -> (StopReason, DetectSnapshot)
where
    F: Future<Output = ()>,
{
    let handle = capture.spawn();
    let mut updates = handle.subscribe();
    let mut session = identity.subscribe();
    let mut expiry_check = tokio::time::interval(EXPIRY_CHECK_INTERVAL);
    let mut last = updates.borrow_and_update().clone();
    tokio::pin!(shutdown);

    info!(source = %last.source, "Detection started");

    let reason = loop {
        tokio::select! {
            () = &mut shutdown => break StopReason::Shutdown,

            changed = updates.changed() => {
                if changed.is_err() {
                    break StopReason::LoopExited;
                }
                let next = updates.borrow_and_update().clone();
                for change in changes(&last, &next) {
                    report(&change);
                }
                last = next;
            }

            state = session.changed() => {
                if !state.is_some_and(|s| s.is_authenticated()) {
                    break StopReason::SessionEnded;
                }
            }

            _ = expiry_check.tick() => {
                identity.expire_if_stale(Utc::now());
            }
        }
    };

    let snapshot = handle.stop().await;
    info!(
        ?reason,
        ticks = snapshot.stats.ticks,
        successes = snapshot.stats.successes,
        failures = snapshot.stats.failures,
        skipped_busy = snapshot.stats.skipped_busy,
        "Detection stopped"
    );
    (reason, snapshot)
}

/// Sign out at the end of a run, logging provider failures
pub async fn sign_out(identity: &IdentityClient) {
    if let Err(e) = identity.sign_out().await {
        warn!(error = %e, "Sign-out failed");
    }
}
