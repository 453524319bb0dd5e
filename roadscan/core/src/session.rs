//! Session State
//!
//! The authenticated identity tracked for the navigation shell.
//!
//! The [`IdentityClient`](crate::identity::IdentityClient) owns the only
//! writer. Everything else observes through a [`SessionSubscription`], an
//! explicit handle over a `tokio::sync::watch` channel. Dropping the handle
//! (or calling [`SessionSubscription::cancel`]) releases it; there is no
//! callback registry to forget to unregister from.

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Opaque handle for the signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHandle {
    /// Provider-assigned user ID
    pub uid: String,
    /// Email the account was created with
    pub email: String,
    /// Provider ID token (empty for providers without tokens)
    #[serde(default)]
    pub id_token: String,
}

/// An authenticated session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Who is signed in
    pub user: UserHandle,
    /// When the session was established
    pub established_at: DateTime<Utc>,
    /// When the provider token stops being valid, if the provider says
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a session established now
    #[must_use]
    pub fn new(user: UserHandle) -> Self {
        Self {
            user,
            established_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Set the expiry instant
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the provider token has expired at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Identity state as seen by observers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// The first state has not been determined yet
    #[default]
    Initializing,
    /// Nobody is signed in
    SignedOut,
    /// A user is signed in
    SignedIn(Session),
}

impl AuthState {
    /// True only when a session is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// The current session, if any
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) => Some(session),
            _ => None,
        }
    }
}

/// A single observer of the identity state
///
/// Each subscription is its own cancellation token: once cancelled or
/// dropped, the underlying receiver is released and no further changes are
/// delivered to it.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: Option<watch::Receiver<AuthState>>,
}

impl SessionSubscription {
    pub(crate) fn new(rx: watch::Receiver<AuthState>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Latest state (marks it as seen)
    ///
    /// Returns [`AuthState::SignedOut`] once cancelled.
    pub fn current(&mut self) -> AuthState {
        match self.rx.as_mut() {
            Some(rx) => rx.borrow_and_update().clone(),
            None => AuthState::SignedOut,
        }
    }

    /// Whether a change arrived that has not been read with [`current`](Self::current)
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx
            .as_ref()
            .is_some_and(|rx| rx.has_changed().unwrap_or(false))
    }

    /// Wait for the next change and return it
    ///
    /// Returns `None` when the subscription was cancelled or the identity
    /// client is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        let rx = self.rx.as_mut()?;
        rx.changed().await.ok()?;
        Some(rx.borrow_and_update().clone())
    }

    /// Release the subscription now
    pub fn cancel(&mut self) {
        if self.rx.take().is_some() {
            tracing::debug!("Session subscription cancelled");
        }
    }

    /// Whether the subscription is still live
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    /// Convert into a stream yielding the current state, then every change
    pub fn into_stream(mut self) -> impl Stream<Item = AuthState> + Unpin {
        match self.rx.take() {
            Some(rx) => futures::future::Either::Left(WatchStream::new(rx)),
            None => futures::future::Either::Right(futures::stream::empty()),
        }
    }
}
