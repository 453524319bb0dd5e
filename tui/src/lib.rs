//! roadscan TUI - Terminal interface for roadscan
//!
//! A full-screen client for the pothole classifier: sign in, open Detect,
//! and watch each frame's label and confidence as it comes back.
//!
//! # Architecture
//!
//! - **App**: event loop, session-driven navigation, capture mount/unmount
//! - **Screens**: Login, Home, Account, Detect, plus shared chrome
//! - **Theme**: ratatui palettes built from the core theme resolver
//! - **Toast**: short-lived notices for auth failures

#![warn(missing_docs)]

pub mod app;
pub mod screens;
pub mod theme;
pub mod toast;

pub use app::{App, CameraFactory, CaptureServices};
