//! Capture Loop Runner
//!
//! One tokio task per mounted Detect screen. The task owns the camera and
//! multiplexes three sources with `select!`:
//!
//! 1. the stop signal (checked first),
//! 2. completion of the in-flight classification request,
//! 3. the capture timer.
//!
//! The request is polled from the same task, so ticks keep arriving while it
//! is pending and are counted as `skipped_busy` instead of queueing up.
//!
//! # Usage
//!
//! ```ignore
//! let camera = DirectoryCamera::new("/var/lib/roadscan/frames");
//! let backend = Arc::new(HttpPredictionClient::new("localhost:5000", None)?);
//! let handle = CaptureLoop::new(Box::new(camera), backend, CaptureConfig::default()).spawn();
//!
//! let mut updates = handle.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{:?}", updates.borrow().last_result);
//! }
//!
//! handle.stop().await;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::camera::Camera;
use super::state::{CaptureLoopState, DetectSnapshot, LoopPhase};
use crate::prediction::{CaptureResult, PredictionBackend, PredictionError};

/// Default capture cadence
pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(500);

type PendingRequest = Pin<Box<dyn Future<Output = Result<CaptureResult, PredictionError>> + Send>>;

/// Loop settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Timer period (default: 500ms)
    pub interval: Duration,
    /// Drop an in-flight request on stop instead of waiting for it (default: true)
    pub abort_in_flight_on_stop: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CAPTURE_INTERVAL,
            abort_in_flight_on_stop: true,
        }
    }
}

impl CaptureConfig {
    /// Set the timer period. Zero is raised to one millisecond.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Choose what happens to an in-flight request on stop
    #[must_use]
    pub fn with_abort_in_flight(mut self, abort: bool) -> Self {
        self.abort_in_flight_on_stop = abort;
        self
    }
}

/// A capture loop that has not been started yet
pub struct CaptureLoop {
    camera: Box<dyn Camera>,
    backend: Arc<dyn PredictionBackend>,
    config: CaptureConfig,
}

impl CaptureLoop {
    /// Create a loop over an owned camera
    pub fn new(
        camera: Box<dyn Camera>,
        backend: Arc<dyn PredictionBackend>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            camera,
            backend,
            config,
        }
    }

    /// Start the loop on the current tokio runtime
    pub fn spawn(self) -> CaptureHandle {
        let initial = DetectSnapshot {
            source: self.camera.describe(),
            ..Default::default()
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(self.run(snapshot_tx, stop_rx));

        CaptureHandle {
            snapshot_rx,
            stop_tx,
            task: Some(task),
        }
    }

    async fn run(mut self, snapshot_tx: watch::Sender<DetectSnapshot>, mut stop_rx: watch::Receiver<bool>) {
        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut state = CaptureLoopState::default();
        let mut in_flight: Option<PendingRequest> = None;

        tracing::info!(
            source = %self.camera.describe(),
            backend = self.backend.name(),
            interval_ms = period.as_millis() as u64,
            "Capture loop started"
        );

        loop {
            tokio::select! {
                biased;

                changed = stop_rx.changed() => {
                    // A closed channel means the handle is gone
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }

                outcome = wait_pending(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    complete(&mut state, outcome, &snapshot_tx);
                }

                _ = ticker.tick() => {
                    match self.on_tick(&mut state, &snapshot_tx, &mut stop_rx).await {
                        Tick::Started(request) => in_flight = Some(request),
                        Tick::Skipped => {}
                        Tick::StopRequested => break,
                    }
                }
            }
        }

        if let Some(request) = in_flight.take() {
            if self.config.abort_in_flight_on_stop {
                tracing::debug!("Dropping in-flight classification request");
                state.finish();
            } else {
                tracing::debug!("Waiting for in-flight classification request");
                complete(&mut state, request.await, &snapshot_tx);
            }
        }

        snapshot_tx.send_modify(|s| s.phase = LoopPhase::Stopped);
        tracing::info!(stats = ?snapshot_tx.borrow().stats, "Capture loop stopped");
    }

    /// Handle one timer tick.
    ///
    /// The frame capture itself races the stop signal, so a slow camera
    /// never delays shutdown.
    async fn on_tick(
        &mut self,
        state: &mut CaptureLoopState,
        snapshot_tx: &watch::Sender<DetectSnapshot>,
        stop_rx: &mut watch::Receiver<bool>,
    ) -> Tick {
        if state.request_in_flight {
            tracing::trace!("Tick skipped: request in flight");
            snapshot_tx.send_modify(|s| {
                s.stats.ticks += 1;
                s.stats.skipped_busy += 1;
            });
            return Tick::Skipped;
        }

        state.camera_ready = self.camera.poll_ready().await;
        if !state.try_begin() {
            tracing::trace!("Tick skipped: camera not ready");
            snapshot_tx.send_modify(|s| {
                s.stats.ticks += 1;
                s.stats.skipped_not_ready += 1;
                s.camera_ready = false;
            });
            return Tick::Skipped;
        }

        snapshot_tx.send_modify(|s| {
            s.stats.ticks += 1;
            s.stats.attempts += 1;
            s.camera_ready = true;
            s.phase = LoopPhase::Capturing;
        });

        let captured = tokio::select! {
            biased;

            // Only `true` is ever sent, and a closed channel means the handle is gone
            _ = stop_rx.changed() => {
                tracing::debug!("Stop requested during frame capture");
                state.finish();
                return Tick::StopRequested;
            }

            frame = self.camera.capture() => frame,
        };

        match captured {
            Ok(frame) => {
                tracing::trace!(source = %frame.source, bytes = frame.bytes.len(), "Frame captured");
                let backend = Arc::clone(&self.backend);
                let request: PendingRequest = Box::pin(async move { backend.classify(frame).await });
                Tick::Started(request)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Frame capture failed");
                state.finish();
                snapshot_tx.send_modify(|s| {
                    s.stats.failures += 1;
                    s.last_error = Some(e.to_string());
                    s.phase = LoopPhase::Idle;
                });
                Tick::Skipped
            }
        }
    }
}

/// What a timer tick led to
enum Tick {
    /// A frame was captured and its request is in flight
    Started(PendingRequest),
    /// Nothing to await (busy, not ready, or the capture failed)
    Skipped,
    /// The stop signal arrived mid-capture
    StopRequested,
}

async fn wait_pending(
    pending: &mut Option<PendingRequest>,
) -> Result<CaptureResult, PredictionError> {
    match pending {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}

fn complete(
    state: &mut CaptureLoopState,
    outcome: Result<CaptureResult, PredictionError>,
    snapshot_tx: &watch::Sender<DetectSnapshot>,
) {
    state.finish();
    match outcome {
        Ok(result) => {
            tracing::debug!(label = %result.label, confidence = result.confidence, "Frame classified");
            snapshot_tx.send_modify(|s| {
                s.stats.successes += 1;
                s.last_result = Some(result);
                s.last_error = None;
                s.phase = LoopPhase::Idle;
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, "Classification request failed");
            snapshot_tx.send_modify(|s| {
                s.stats.failures += 1;
                s.last_error = Some(e.to_string());
                s.phase = LoopPhase::Idle;
            });
        }
    }
}

/// Control handle for a running capture loop.
///
/// Dropping the handle stops the loop.
pub struct CaptureHandle {
    snapshot_rx: watch::Receiver<DetectSnapshot>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    /// Latest display state
    #[must_use]
    pub fn snapshot(&self) -> DetectSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DetectSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Whether the loop task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the timer and wait for the loop to exit. Returns the final state.
    pub async fn stop(mut self) -> DetectSnapshot {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Capture loop task failed");
            }
        }
        self.snapshot()
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CameraError, Frame};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticCamera {
        ready: bool,
    }

    #[async_trait]
    impl Camera for StaticCamera {
        fn describe(&self) -> String {
            "static".to_string()
        }

        async fn poll_ready(&mut self) -> bool {
            self.ready
        }

        async fn capture(&mut self) -> Result<Frame, CameraError> {
            Ok(Frame::jpeg(vec![0xFF, 0xD8, 0xFF], "static"))
        }
    }

    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PredictionBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        async fn classify(&self, _frame: Frame) -> Result<CaptureResult, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CaptureResult::new("Pothole detected", 0.97))
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.interval, Duration::from_millis(500));
        assert!(config.abort_in_flight_on_stop);
        assert_eq!(
            CaptureConfig::default().with_interval(Duration::ZERO).interval,
            Duration::from_millis(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_capture_after_one_period() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let handle = CaptureLoop::new(
            Box::new(StaticCamera { ready: true }),
            backend.clone(),
            CaptureConfig::default(),
        )
        .spawn();

        let mut updates = handle.subscribe();
        updates
            .wait_for(|s| s.stats.successes >= 1)
            .await
            .unwrap();

        let snapshot = handle.stop().await;
        assert_eq!(snapshot.phase, LoopPhase::Stopped);
        assert_eq!(snapshot.source, "static");
        assert_eq!(snapshot.confidence_text().as_deref(), Some("(97.00%)"));
        assert!(backend.calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_camera_never_calls_backend() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let handle = CaptureLoop::new(
            Box::new(StaticCamera { ready: false }),
            backend.clone(),
            CaptureConfig::default(),
        )
        .spawn();

        let mut updates = handle.subscribe();
        updates
            .wait_for(|s| s.stats.skipped_not_ready >= 3)
            .await
            .unwrap();

        let snapshot = handle.stop().await;
        assert_eq!(snapshot.stats.attempts, 0);
        assert!(!snapshot.camera_ready);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    /// Camera whose capture never returns
    struct StuckCamera;

    #[async_trait]
    impl Camera for StuckCamera {
        fn describe(&self) -> String {
            "stuck".to_string()
        }

        async fn poll_ready(&mut self) -> bool {
            true
        }

        async fn capture(&mut self) -> Result<Frame, CameraError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_slow_capture() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let handle = CaptureLoop::new(Box::new(StuckCamera), backend.clone(), CaptureConfig::default())
            .spawn();

        let mut updates = handle.subscribe();
        updates
            .wait_for(|s| s.phase == LoopPhase::Capturing)
            .await
            .unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("stop must not wait for the camera");
        assert_eq!(snapshot.phase, LoopPhase::Stopped);
        assert_eq!(snapshot.stats.attempts, 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_loop() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let handle = CaptureLoop::new(
            Box::new(StaticCamera { ready: true }),
            backend,
            CaptureConfig::default(),
        )
        .spawn();

        let mut updates = handle.subscribe();
        drop(handle);

        // The sender closes right after publishing Stopped
        let _ = updates.wait_for(|s| s.phase == LoopPhase::Stopped).await;
        assert_eq!(updates.borrow().phase, LoopPhase::Stopped);
    }
}
