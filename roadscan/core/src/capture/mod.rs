//! Capture-and-Classify Loop
//!
//! While the Detect screen is mounted, a fixed-period timer takes a frame
//! from the camera and posts it to the prediction backend. At most one
//! request is ever in flight; ticks that land during a request are skipped.
//! Failures are logged and forgotten, and the next tick tries again.
//!
//! # Modules
//!
//! - `camera`: frame sources ([`Camera`], [`DirectoryCamera`])
//! - `state`: loop state machine and display snapshot
//! - `runner`: the timer task and its [`CaptureHandle`]

mod camera;
mod runner;
mod state;

pub use camera::{Camera, CameraError, DirectoryCamera, Frame, FRAME_FILE_NAME, JPEG_MIME};
pub use runner::{CaptureConfig, CaptureHandle, CaptureLoop, DEFAULT_CAPTURE_INTERVAL};
pub use state::{
    format_confidence, CaptureLoopState, CaptureStats, DetectSnapshot, LoopPhase,
};
