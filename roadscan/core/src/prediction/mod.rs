//! Prediction Endpoint Integration
//!
//! Abstracted access to the remote image classifier through a common trait,
//! so the capture loop can be driven by the real HTTP endpoint or by a test
//! double.
//!
//! # Usage
//!
//! ```ignore
//! use roadscan_core::prediction::{HttpPredictionClient, PredictionBackend};
//!
//! let client = HttpPredictionClient::new("http://192.168.1.20:5000", None)?;
//! let result = client.classify(frame).await?;
//! println!("{} {}", result.label, roadscan_core::format_confidence(result.confidence));
//! ```

mod http;
mod traits;

pub use http::{normalize_endpoint, HttpPredictionClient, FILE_FIELD};
pub use traits::{CaptureResult, PredictionBackend, PredictionError};
