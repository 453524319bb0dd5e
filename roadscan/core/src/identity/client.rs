//! Identity Client
//!
//! Wraps an [`IdentityProvider`] and owns the session observable.
//!
//! State transitions:
//!
//! ```text
//! Initializing --start()--> SignedOut --sign_in/register ok--> SignedIn
//!                               ^                                  |
//!                               +---- sign_out / invalidate -------+
//! ```
//!
//! Failed calls never touch the state. Empty form fields are rejected
//! before the provider is contacted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::firebase::FirebaseProvider;
use super::memory::InMemoryProvider;
use super::traits::{Credentials, IdentityProvider, ProviderConfig};
use crate::session::{AuthState, Session, SessionSubscription};

/// Sign-in/registration front end with an observable session
#[derive(Clone)]
pub struct IdentityClient {
    provider: Arc<dyn IdentityProvider>,
    state_tx: Arc<watch::Sender<AuthState>>,
}

impl IdentityClient {
    /// Create a client in the `Initializing` state
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    /// Create a client around a shared provider
    #[must_use]
    pub fn from_arc(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Initializing);
        Self {
            provider,
            state_tx: Arc::new(state_tx),
        }
    }

    /// Create a client for the configured provider
    #[must_use]
    pub fn from_config(config: &ProviderConfig) -> Self {
        match FirebaseProvider::from_config(config) {
            Some(firebase) => Self::new(firebase),
            None => Self::new(InMemoryProvider::new()),
        }
    }

    /// Provider name for display and logs
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Resolve the initial state.
    ///
    /// Sessions are not persisted, so the client always starts signed out.
    pub fn start(&self) {
        let changed = self.state_tx.send_if_modified(|state| {
            if matches!(state, AuthState::Initializing) {
                *state = AuthState::SignedOut;
                true
            } else {
                false
            }
        });
        if changed {
            debug!(provider = self.provider.name(), "Identity client started");
        }
    }

    /// Current state snapshot
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Current session, if signed in
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.state_tx.borrow().session().cloned()
    }

    /// Observe state changes
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.state_tx.subscribe())
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state_tx.receiver_count()
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = Credentials::new(email, password)?;
        match self.provider.sign_in(&credentials).await {
            Ok(session) => {
                info!(email = %session.user.email, "User account signed in");
                self.publish(AuthState::SignedIn(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                Err(e)
            }
        }
    }

    /// Create an account and sign into it
    pub async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = Credentials::new(email, password)?;
        match self.provider.register(&credentials).await {
            Ok(session) => {
                info!(email = %session.user.email, "User account created and signed in");
                self.publish(AuthState::SignedIn(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                Err(e)
            }
        }
    }

    /// End the current session.
    ///
    /// The local state is cleared even if the provider call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            return Ok(());
        };

        let result = self.provider.sign_out(&session).await;
        if let Err(ref e) = result {
            warn!(error = %e, "Provider sign-out failed; clearing local session anyway");
        }

        info!(email = %session.user.email, "User signed out");
        self.publish(AuthState::SignedOut);
        result
    }

    /// Drop the session because the provider reported it invalid
    pub fn invalidate(&self, reason: &str) {
        if self.state_tx.borrow().is_authenticated() {
            warn!(reason, "Session invalidated");
            self.publish(AuthState::SignedOut);
        }
    }

    /// Invalidate the session if its provider token expired at `now`.
    ///
    /// Returns true when the session was dropped.
    pub fn expire_if_stale(&self, now: DateTime<Utc>) -> bool {
        let expired = self
            .state_tx
            .borrow()
            .session()
            .is_some_and(|s| s.is_expired(now));
        if expired {
            self.invalidate("token expired");
        }
        expired
    }

    fn publish(&self, state: AuthState) {
        self.state_tx.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::InMemoryProvider;
    use crate::session::UserHandle;

    fn client_with(provider: InMemoryProvider) -> (IdentityClient, Arc<InMemoryProvider>) {
        let provider = Arc::new(provider);
        let client = IdentityClient::from_arc(provider.clone());
        client.start();
        (client, provider)
    }

    #[test]
    fn test_start_leaves_initializing() {
        let client = IdentityClient::new(InMemoryProvider::new());
        assert_eq!(client.state(), AuthState::Initializing);
        client.start();
        assert_eq!(client.state(), AuthState::SignedOut);
        // Idempotent
        client.start();
        assert_eq!(client.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_empty_fields_never_reach_provider() {
        let (client, provider) = client_with(InMemoryProvider::new());

        for (email, password) in [("", "pw"), ("a@b.co", ""), ("", "")] {
            assert_eq!(
                client.sign_in(email, password).await,
                Err(AuthError::MissingFields)
            );
            assert_eq!(
                client.register(email, password).await,
                Err(AuthError::MissingFields)
            );
        }

        assert_eq!(provider.call_count(), 0);
        assert_eq!(client.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_in_publishes_session() {
        let (client, _) = client_with(InMemoryProvider::with_account("d@x.io", "pw1234"));
        let mut sub = client.subscribe();
        assert_eq!(sub.current(), AuthState::SignedOut);

        let session = client.sign_in("d@x.io", "pw1234").await.unwrap();
        let state = sub.changed().await.unwrap();
        assert_eq!(state, AuthState::SignedIn(session));
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_state() {
        let (client, _) = client_with(InMemoryProvider::with_account("d@x.io", "pw1234"));
        let sub = client.subscribe();

        assert_eq!(
            client.sign_in("d@x.io", "wrong").await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(!sub.has_changed());
        assert_eq!(client.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_duplicate_register_keeps_session() {
        let (client, _) = client_with(InMemoryProvider::with_account("d@x.io", "pw1234"));
        let session = client.sign_in("d@x.io", "pw1234").await.unwrap();

        assert_eq!(
            client.register("d@x.io", "pw1234").await,
            Err(AuthError::EmailAlreadyInUse)
        );
        assert_eq!(client.session(), Some(session));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let (client, _) = client_with(InMemoryProvider::new());
        client.register("new@x.io", "pw1234").await.unwrap();
        assert!(client.state().is_authenticated());

        client.sign_out().await.unwrap();
        assert_eq!(client.state(), AuthState::SignedOut);

        // Signing out twice is harmless
        client.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_expire_if_stale() {
        let (client, _) = client_with(InMemoryProvider::new());
        let now = Utc::now();
        client.publish(AuthState::SignedIn(
            Session::new(UserHandle {
                uid: "u".into(),
                email: "e@x.io".into(),
                id_token: "t".into(),
            })
            .with_expiry(now + chrono::Duration::seconds(30)),
        ));

        assert!(!client.expire_if_stale(now));
        assert!(client.state().is_authenticated());
        assert!(client.expire_if_stale(now + chrono::Duration::seconds(31)));
        assert_eq!(client.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_drops() {
        let (client, _) = client_with(InMemoryProvider::new());
        let a = client.subscribe();
        let mut b = client.subscribe();
        assert_eq!(client.subscriber_count(), 2);
        b.cancel();
        assert_eq!(client.subscriber_count(), 1);
        drop(a);
        assert_eq!(client.subscriber_count(), 0);
    }
}
