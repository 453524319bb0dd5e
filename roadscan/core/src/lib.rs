//! roadscan Core - Headless Pothole Detection Client
//!
//! This crate holds everything roadscan does apart from drawing: the
//! identity client and its session observable, the navigation shell, the
//! theme resolver, and the capture-and-classify loop that posts camera
//! frames to a remote classifier. The terminal UI and the daemon are thin
//! surfaces over it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Surfaces                             │
//! │        ┌──────────────┐            ┌──────────────┐          │
//! │        │     TUI      │            │    Daemon    │          │
//! │        │  (ratatui)   │            │    (clap)    │          │
//! │        └──────┬───────┘            └──────┬───────┘          │
//! └───────────────┼───────────────────────────┼──────────────────┘
//!                 │                           │
//! ┌───────────────┼───────────────────────────┼──────────────────┐
//! │               │       ROADSCAN CORE       │                  │
//! │  ┌────────────┴──────────┐   ┌────────────┴───────────────┐  │
//! │  │   Navigation Shell    │   │   Capture-and-Classify     │  │
//! │  │  AuthState → Screens  │   │  Camera → POST /predict    │  │
//! │  └────────────┬──────────┘   └────────────┬───────────────┘  │
//! │  ┌────────────┴──────────┐   ┌────────────┴───────────────┐  │
//! │  │   Identity Client     │   │   Prediction Backend       │  │
//! │  │  watch<AuthState>     │   │  (HTTP multipart)          │  │
//! │  └────────────┬──────────┘   └────────────────────────────┘  │
//! │  ┌────────────┴──────────┐   ┌────────────────────────────┐  │
//! │  │  Identity Provider    │   │   Theme Resolver           │  │
//! │  │ (Firebase / memory)   │   │  scheme → color tokens     │  │
//! │  └───────────────────────┘   └────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`IdentityClient`]: sign-in, registration and the session observable
//! - [`Navigator`]: which screens exist for the current [`AuthState`]
//! - [`CaptureLoop`]: the timer-driven capture task, controlled through [`CaptureHandle`]
//! - [`HttpPredictionClient`]: the `/predict` endpoint client
//! - [`Theme`]: color tokens for a [`ColorScheme`]
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use roadscan_core::{
//!     config::load_config, CaptureLoop, DirectoryCamera, HttpPredictionClient, IdentityClient,
//! };
//!
//! let config = load_config()?;
//! let identity = IdentityClient::from_config(&config.provider_config());
//! identity.start();
//! identity.sign_in("driver@example.com", "hunter22").await?;
//!
//! let backend = HttpPredictionClient::new(&config.endpoint, config.request_timeout())?;
//! let camera = DirectoryCamera::new(&config.frames_dir);
//! let handle = CaptureLoop::new(Box::new(camera), Arc::new(backend), config.capture_config()).spawn();
//! ```
//!
//! # Module Overview
//!
//! - [`capture`]: camera abstraction, loop state and the capture task
//! - [`config`]: TOML, environment and CLI configuration
//! - [`identity`]: identity providers and the identity client
//! - [`navigation`]: screen graph and back stack
//! - [`prediction`]: classifier backend abstraction and HTTP client
//! - [`session`]: session types and the session subscription
//! - [`theme`]: color tokens and light/dark resolution
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod config;
pub mod identity;
pub mod navigation;
pub mod prediction;
pub mod session;
pub mod theme;

// Re-exports for convenience
pub use capture::{
    format_confidence, Camera, CameraError, CaptureConfig, CaptureHandle, CaptureLoop,
    CaptureLoopState, CaptureStats, DetectSnapshot, DirectoryCamera, Frame, LoopPhase,
};
pub use config::{ConfigError, ConfigOverrides, ConfigSource, RoadscanConfig};
pub use identity::{
    auth_notice, AuthError, AuthOperation, FirebaseProvider, IdentityClient, IdentityProvider,
    InMemoryProvider, ProviderConfig,
};
pub use navigation::{NavigationError, Navigator, Screen, ScreenGraph, Tab};
pub use prediction::{CaptureResult, HttpPredictionClient, PredictionBackend, PredictionError};
pub use session::{AuthState, Session, SessionSubscription, UserHandle};
pub use theme::{ColorScheme, HexColor, Theme, ThemeColors, ThemeMode};
