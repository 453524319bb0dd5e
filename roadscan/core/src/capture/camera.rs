//! Camera Abstraction
//!
//! A camera produces JPEG frames on demand. The capture loop owns exactly
//! one camera and hands it to the capture step directly; nothing else holds
//! a reference to it.
//!
//! [`DirectoryCamera`] is the shipped source: it replays the JPEG files of a
//! directory in name order, wrapping around at the end. Point it at a
//! folder a dashcam or phone syncs into, or at a fixed test set.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// MIME type of every frame sent to the classifier
pub const JPEG_MIME: &str = "image/jpeg";

/// File name used for the multipart attachment
pub const FRAME_FILE_NAME: &str = "image.jpg";

/// One captured image
#[derive(Clone, Debug)]
pub struct Frame {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub mime: String,
    /// Attachment file name
    pub file_name: String,
    /// Where the frame came from (path, device), for logs
    pub source: String,
    /// Capture time
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Wrap JPEG bytes captured now
    pub fn jpeg(bytes: Vec<u8>, source: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: JPEG_MIME.to_string(),
            file_name: FRAME_FILE_NAME.to_string(),
            source: source.into(),
            captured_at: Utc::now(),
        }
    }
}

/// Camera failures
#[derive(Debug, Error)]
pub enum CameraError {
    /// Capture requested before the camera was ready
    #[error("camera is not ready")]
    NotReady,

    /// Reading a frame (or listing frames) failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Frame source owned by the capture loop
#[async_trait]
pub trait Camera: Send {
    /// Human-readable source description
    fn describe(&self) -> String;

    /// Check (and if needed, prepare) readiness.
    ///
    /// Called on every timer tick while the loop is idle, so it must be
    /// cheap once the camera is ready.
    async fn poll_ready(&mut self) -> bool;

    /// Take one frame
    async fn capture(&mut self) -> Result<Frame, CameraError>;
}

/// Replays JPEG files from a directory
pub struct DirectoryCamera {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    next: usize,
}

impl DirectoryCamera {
    /// Create a camera over `dir`. Frames are listed on the first readiness poll.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames: Vec::new(),
            next: 0,
        }
    }

    /// Directory being replayed
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames found
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Re-list the directory
    pub async fn rescan(&mut self) -> Result<usize, CameraError> {
        let io_err = |source| CameraError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;
        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if is_jpeg(&path) {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.len() != self.frames.len() {
            tracing::debug!(dir = %self.dir.display(), count = frames.len(), "Frame directory scanned");
        }
        self.frames = frames;
        self.next %= self.frames.len().max(1);
        Ok(self.frames.len())
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

#[async_trait]
impl Camera for DirectoryCamera {
    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }

    async fn poll_ready(&mut self) -> bool {
        if !self.frames.is_empty() {
            return true;
        }
        match self.rescan().await {
            Ok(count) => count > 0,
            Err(e) => {
                tracing::debug!(error = %e, "Frame directory not readable yet");
                false
            }
        }
    }

    async fn capture(&mut self) -> Result<Frame, CameraError> {
        let Some(path) = self.frames.get(self.next).cloned() else {
            return Err(CameraError::NotReady);
        };
        self.next = (self.next + 1) % self.frames.len();

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Frame::jpeg(bytes, path.display().to_string())),
            Err(source) => {
                // The file vanished or became unreadable: list again next tick
                self.frames.clear();
                self.next = 0;
                Err(CameraError::Io { path, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_jpeg() {
        assert!(is_jpeg(Path::new("a.jpg")));
        assert!(is_jpeg(Path::new("b.JPEG")));
        assert!(!is_jpeg(Path::new("c.png")));
        assert!(!is_jpeg(Path::new("noext")));
    }

    #[test]
    fn test_frame_jpeg_defaults() {
        let frame = Frame::jpeg(vec![0xFF, 0xD8], "cam0");
        assert_eq!(frame.mime, "image/jpeg");
        assert_eq!(frame.file_name, "image.jpg");
        assert_eq!(frame.source, "cam0");
    }

    #[tokio::test]
    async fn test_directory_camera_cycles_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"second").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"first").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut camera = DirectoryCamera::new(dir.path());
        assert!(camera.poll_ready().await);
        assert_eq!(camera.frame_count(), 2);

        assert_eq!(camera.capture().await.unwrap().bytes, b"first");
        assert_eq!(camera.capture().await.unwrap().bytes, b"second");
        assert_eq!(camera.capture().await.unwrap().bytes, b"first");
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = DirectoryCamera::new(dir.path());
        assert!(!camera.poll_ready().await);
        assert!(matches!(camera.capture().await, Err(CameraError::NotReady)));

        std::fs::write(dir.path().join("late.jpeg"), b"x").unwrap();
        assert!(camera.poll_ready().await);
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_ready() {
        let mut camera = DirectoryCamera::new("/definitely/not/here");
        assert!(!camera.poll_ready().await);
    }
}
