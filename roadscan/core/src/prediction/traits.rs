//! Prediction Backend Traits
//!
//! A prediction backend turns one captured frame into one classification.
//! The loop never retries a failed call; the next timer tick simply tries
//! again with a fresh frame.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::Frame;

/// Outcome of one successful classification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    /// Classification label (e.g. "Pothole detected")
    pub label: String,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

impl CaptureResult {
    /// Create a result, clamping confidence into [0, 1].
    ///
    /// NaN becomes 0 and negative zero becomes positive zero.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            // `+ 0.0` turns -0.0 into 0.0
            confidence.clamp(0.0, 1.0) + 0.0
        };
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Failures of a classification call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    /// Could not reach the endpoint
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Endpoint answered with a non-2xx status
    #[error("prediction endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for logs
        body: String,
    },

    /// 2xx response that is not `{result, confidence}`
    #[error("invalid prediction response: {0}")]
    InvalidResponse(String),

    /// The request could not be built (bad MIME type, bad URL)
    #[error("invalid prediction request: {0}")]
    InvalidRequest(String),
}

/// Remote image classifier
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Classify one frame
    async fn classify(&self, frame: Frame) -> Result<CaptureResult, PredictionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert!((CaptureResult::new("x", 1.7).confidence - 1.0).abs() < f64::EPSILON);
        assert!(CaptureResult::new("x", -0.2).confidence.abs() < f64::EPSILON);
        assert!((CaptureResult::new("x", 0.42).confidence - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn test_confidence_has_no_sign_or_nan() {
        let zero = CaptureResult::new("x", -0.0).confidence;
        assert!(zero.is_sign_positive());
        assert_eq!(crate::capture::format_confidence(zero), "(0.00%)");

        let nan = CaptureResult::new("x", f64::NAN).confidence;
        assert!(!nan.is_nan());
        assert_eq!(crate::capture::format_confidence(nan), "(0.00%)");

        assert!(CaptureResult::new("x", -3.5).confidence.is_sign_positive());
    }
}
