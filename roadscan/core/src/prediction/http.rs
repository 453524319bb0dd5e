//! HTTP Prediction Client
//!
//! Posts frames to a Flask-style classifier.
//!
//! # Wire format
//!
//! ```text
//! POST <endpoint>/predict
//! Content-Type: multipart/form-data; boundary=...
//!
//! --boundary
//! Content-Disposition: form-data; name="file"; filename="image.jpg"
//! Content-Type: image/jpeg
//!
//! <jpeg bytes>
//! ```
//!
//! A 2xx answer carries `{"result": "...", "confidence": 0.97}`. Anything
//! else, including `400 {"error": "No file provided"}`, is a failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Deserialize;

use super::traits::{CaptureResult, PredictionBackend, PredictionError};
use crate::capture::Frame;

/// Multipart field the classifier reads
pub const FILE_FIELD: &str = "file";

#[derive(Deserialize)]
struct PredictResponse {
    result: String,
    confidence: f64,
}

/// Turn a configured endpoint into a base URL.
///
/// Scheme-less values such as `localhost:5000` get `http://`.
pub fn normalize_endpoint(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("endpoint is empty".to_string());
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| format!("{raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("{raw:?}: unsupported scheme {other:?}")),
    }
    if url.host_str().is_none() {
        return Err(format!("{raw:?}: missing host"));
    }
    Ok(url)
}

/// HTTP client for the `/predict` endpoint
#[derive(Clone)]
pub struct HttpPredictionClient {
    /// Full `/predict` URL
    predict_url: Url,
    /// Per-request timeout (`None` = wait forever)
    timeout: Option<Duration>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpPredictionClient {
    /// Create a client for `endpoint` (base URL, `/predict` is appended)
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, PredictionError> {
        let base = normalize_endpoint(endpoint).map_err(PredictionError::InvalidRequest)?;
        let predict_url = Url::parse(&format!("{}/predict", base.as_str().trim_end_matches('/')))
            .map_err(|e| PredictionError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            predict_url,
            timeout,
            http_client: reqwest::Client::new(),
        })
    }

    /// The URL frames are posted to
    #[must_use]
    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout
            .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
    }

    fn map_send_error(&self, err: &reqwest::Error) -> PredictionError {
        if err.is_timeout() {
            PredictionError::Timeout(self.timeout_ms())
        } else {
            PredictionError::Network(err.to_string())
        }
    }
}

fn parse_response(body: &str) -> Result<CaptureResult, PredictionError> {
    let data: PredictResponse = serde_json::from_str(body)
        .map_err(|e| PredictionError::InvalidResponse(format!("{e}: {body}")))?;
    if !data.confidence.is_finite() {
        return Err(PredictionError::InvalidResponse(format!(
            "confidence is not a number: {body}"
        )));
    }
    Ok(CaptureResult::new(data.result, data.confidence))
}

#[async_trait]
impl PredictionBackend for HttpPredictionClient {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn classify(&self, frame: Frame) -> Result<CaptureResult, PredictionError> {
        let part = Part::bytes(frame.bytes)
            .file_name(frame.file_name)
            .mime_str(&frame.mime)
            .map_err(|e| PredictionError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        let mut request = self.http_client.post(self.predict_url.clone()).multipart(form);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(&e))?;

        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}
