//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin client of the core:
//! - Event loop (keyboard, frame tick)
//! - IdentityClient session changes drive the Navigator
//! - The Detect screen mounts a CaptureLoop and unmounts it on exit
//! - Auth requests run as background tasks; their notices become toasts

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::widgets::Block;
use ratatui::{Frame, Terminal};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use roadscan_core::{
    auth_notice, AuthOperation, AuthState, Camera, CaptureConfig, CaptureHandle, CaptureLoop,
    ColorScheme, DetectSnapshot, IdentityClient, Navigator, PredictionBackend, Screen,
    SessionSubscription,
};

use crate::screens::{self, login::LoginForm, HEADER_HEIGHT, TAB_BAR_HEIGHT};
use crate::theme::TuiTheme;
use crate::toast::Toast;

/// Redraw period when no input arrives
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// How long exit waits for an unmounting capture loop
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Builds a fresh camera each time Detect is mounted
pub type CameraFactory = Box<dyn Fn() -> Box<dyn Camera> + Send + Sync>;

/// Everything needed to start a capture loop
pub struct CaptureServices {
    backend: Arc<dyn PredictionBackend>,
    camera: CameraFactory,
    config: CaptureConfig,
}

impl CaptureServices {
    /// Bundle a classifier, a camera factory and the loop settings
    pub fn new(
        backend: Arc<dyn PredictionBackend>,
        camera: CameraFactory,
        config: CaptureConfig,
    ) -> Self {
        Self {
            backend,
            camera,
            config,
        }
    }

    fn start(&self) -> CaptureHandle {
        CaptureLoop::new((self.camera)(), self.backend.clone(), self.config.clone()).spawn()
    }
}

/// Background auth task; resolves to a notice to show, if any
type PendingAuth = JoinHandle<Option<&'static str>>;

/// Capture loop being stopped in the background; resolves to its final snapshot
type Unmounting = JoinHandle<DetectSnapshot>;

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Identity ===
    identity: IdentityClient,
    session: SessionSubscription,
    auth_state: AuthState,
    /// Sign-in, register or sign-out in flight
    pending: Option<PendingAuth>,

    // === Navigation ===
    navigator: Navigator,

    // === Detect ===
    services: CaptureServices,
    /// Mounted capture loop (only while Detect is on screen)
    capture: Option<CaptureHandle>,
    /// Loop that left Detect but has not finished stopping yet
    unmounting: Option<Unmounting>,
    detect: DetectSnapshot,

    // === UI State ===
    login: LoginForm,
    toast: Option<Toast>,
    theme: TuiTheme,
}

impl App {
    /// Create the app; nothing is shown but the splash until
    /// [`IdentityClient::start`] resolves the initial state.
    pub fn new(identity: IdentityClient, services: CaptureServices, scheme: ColorScheme) -> Self {
        let mut session = identity.subscribe();
        let auth_state = session.current();
        let navigator = Navigator::new(&auth_state);

        Self {
            running: true,
            identity,
            session,
            auth_state,
            pending: None,
            navigator,
            services,
            capture: None,
            unmounting: None,
            detect: DetectSnapshot::default(),
            login: LoginForm::new(),
            toast: None,
            theme: TuiTheme::new(scheme),
        }
    }

    /// False once the user asked to quit
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Screen on top, `None` while the splash shows
    #[must_use]
    pub fn current_screen(&self) -> Option<Screen> {
        self.navigator.current()
    }

    /// Visible toast text
    #[must_use]
    pub fn toast_message(&self) -> Option<&str> {
        self.toast.as_ref().map(Toast::message)
    }

    /// Login inputs as typed
    #[must_use]
    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    /// Latest capture state shown on Detect
    #[must_use]
    pub fn detect_snapshot(&self) -> &DetectSnapshot {
        &self.detect
    }

    /// Whether a capture loop is mounted
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Splash until the identity client resolves
        terminal.draw(|f| self.draw(f))?;
        self.identity.start();

        let mut event_stream = EventStream::new();
        let mut frame_tick = tokio::time::interval(FRAME_INTERVAL);
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                _ = frame_tick.tick() => {}
            }

            self.update().await;
            terminal.draw(|f| self.draw(f))?;
        }

        self.shutdown().await;
        Ok(())
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        match self.navigator.current() {
            None => {
                if key.code == KeyCode::Esc {
                    self.running = false;
                }
            }
            Some(Screen::Login) => self.handle_login_key(key),
            Some(Screen::Detect) => {
                if key.code == KeyCode::Esc {
                    self.navigator.back();
                }
            }
            Some(screen) => match key.code {
                KeyCode::Esc => self.running = false,
                KeyCode::Left | KeyCode::Right => {
                    if let Some(tab) = self.navigator.active_tab() {
                        if let Err(e) = self.navigator.select_tab(tab.toggled()) {
                            debug!(error = %e, "Tab switch ignored");
                        }
                    }
                }
                KeyCode::Enter if screen == Screen::Home => {
                    if let Err(e) = self.navigator.navigate(Screen::Detect) {
                        warn!(error = %e, "Cannot open Detect");
                    }
                }
                KeyCode::Char('s') if screen == Screen::Account => self.sign_out(),
                _ => {}
            },
        }

        self.sync_capture();
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.toggle_focus();
            }
            KeyCode::Enter => self.submit(AuthOperation::SignIn),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit(AuthOperation::Register);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.login.push(c);
            }
            KeyCode::Backspace => self.login.pop(),
            _ => {}
        }
    }

    /// Start a sign-in or registration with the form contents
    fn submit(&mut self, operation: AuthOperation) {
        if self.pending.is_some() {
            debug!(?operation, "Auth request already in flight");
            return;
        }

        let identity = self.identity.clone();
        let email = self.login.email().to_string();
        let password = self.login.password().to_string();

        self.pending = Some(tokio::spawn(async move {
            let result = match operation {
                AuthOperation::SignIn => identity.sign_in(&email, &password).await,
                AuthOperation::Register => identity.register(&email, &password).await,
            };
            match result {
                Ok(session) => {
                    info!(email = %session.user.email, ?operation, "Signed in");
                    None
                }
                Err(e) => {
                    warn!(error = %e, ?operation, "Authentication failed");
                    Some(auth_notice(operation, &e))
                }
            }
        }));
    }

    fn sign_out(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let identity = self.identity.clone();
        self.pending = Some(tokio::spawn(async move {
            if let Err(e) = identity.sign_out().await {
                warn!(error = %e, "Sign-out failed");
            }
            None
        }));
    }

    fn finish_pending(&mut self, result: Result<Option<&'static str>, JoinError>) {
        match result {
            Ok(Some(notice)) => self.show_toast(notice),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Auth task failed"),
        }
    }

    fn show_toast(&mut self, message: &str) {
        self.toast = Some(Toast::new(message, Instant::now()));
    }

    /// Apply background results and session changes
    pub async fn update(&mut self) {
        if self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.pending.take() {
                let result = task.await;
                self.finish_pending(result);
            }
        }

        self.identity.expire_if_stale(Utc::now());
        if self.session.has_changed() {
            let state = self.session.current();
            self.apply_auth_state(state);
        }

        self.sync_capture();
        if self.unmounting.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.unmounting.take() {
                let result = task.await;
                self.finish_unmount(result);
            }
        }
        if let Some(handle) = &self.capture {
            self.detect = handle.snapshot();
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired(Instant::now())) {
            self.toast = None;
        }
    }

    /// Wait for any in-flight auth task and any unmounting capture loop,
    /// then [`update`](Self::update)
    pub async fn settle(&mut self) {
        if let Some(task) = self.pending.take() {
            let result = task.await;
            self.finish_pending(result);
        }
        self.update().await;
        if let Some(task) = self.unmounting.take() {
            let result = task.await;
            self.finish_unmount(result);
        }
    }

    fn apply_auth_state(&mut self, state: AuthState) {
        if self.navigator.apply(&state) {
            self.login.clear();
        }
        self.auth_state = state;
    }

    /// Mount the capture loop on Detect, unmount it everywhere else.
    ///
    /// Unmounting never waits on the loop: the stop runs as a background
    /// task whose final snapshot is picked up by a later update.
    fn sync_capture(&mut self) {
        let on_detect = self.navigator.current() == Some(Screen::Detect);

        if on_detect && self.capture.is_none() {
            // A loop still draining from the last visit keeps running on its own
            if let Some(task) = self.unmounting.take() {
                debug!("Detect remounted before the previous loop stopped");
                drop(task);
            }
            let handle = self.services.start();
            self.detect = handle.snapshot();
            info!(source = %self.detect.source, "Detect mounted");
            self.capture = Some(handle);
        } else if !on_detect {
            if let Some(handle) = self.capture.take() {
                debug!("Detect unmounting");
                self.unmounting = Some(tokio::spawn(handle.stop()));
            }
        }
    }

    fn finish_unmount(&mut self, result: Result<DetectSnapshot, JoinError>) {
        match result {
            Ok(snapshot) => {
                info!(
                    successes = snapshot.stats.successes,
                    failures = snapshot.stats.failures,
                    "Detect unmounted"
                );
                self.detect = snapshot;
            }
            Err(e) => warn!(error = %e, "Capture loop task failed"),
        }
    }

    /// Stop the capture loop before exit, waiting at most [`SHUTDOWN_GRACE`]
    pub async fn shutdown(&mut self) {
        self.running = false;
        if let Some(handle) = self.capture.take() {
            self.unmounting = Some(tokio::spawn(handle.stop()));
        }
        if let Some(task) = self.unmounting.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(result) => self.finish_unmount(result),
                Err(_) => warn!(
                    grace_ms = SHUTDOWN_GRACE.as_millis() as u64,
                    "Capture loop still busy at exit"
                ),
            }
        }
    }

    /// Render the current screen
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = match self.navigator.current() {
            Some(Screen::Login) => &self.theme.login,
            _ => &self.theme.app,
        };
        frame.render_widget(Block::default().style(palette.base()), area);

        match self.navigator.current() {
            // Splash: background only
            None => {}
            Some(Screen::Login) => screens::login::render(frame, area, &self.login, &self.theme),
            Some(screen) => {
                let [header, body, tabs] = Layout::vertical([
                    Constraint::Length(HEADER_HEIGHT),
                    Constraint::Min(0),
                    Constraint::Length(TAB_BAR_HEIGHT),
                ])
                .areas(area);

                screens::render_header(frame, header, screen, palette);
                match screen {
                    Screen::Home => screens::home::render(frame, body, palette),
                    Screen::Account => {
                        let email = self.auth_state.session().map(|s| s.user.email.as_str());
                        screens::account::render(frame, body, email, palette);
                    }
                    Screen::Detect => screens::detect::render(frame, body, &self.detect, palette),
                    Screen::Login => {}
                }
                if let Some(tab) = screen.tab() {
                    screens::render_tabs(frame, tabs, tab, palette);
                }
            }
        }

        if let Some(toast) = &self.toast {
            screens::render_toast(frame, area, toast.message(), palette);
        }
    }
}
