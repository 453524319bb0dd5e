//! Integration tests for the identity client driving the navigation shell
//!
//! These tests verify that:
//! - Empty form fields never reach the provider
//! - Sign-in and registration publish the session to subscribers
//! - The screen graph follows the session (Login only vs tabs plus Detect)
//! - Failed registration leaves the session untouched

use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

use roadscan_core::identity::{
    auth_notice, AuthError, AuthOperation, IdentityClient, InMemoryProvider,
};
use roadscan_core::navigation::{Navigator, Screen, ScreenGraph, Tab};
use roadscan_core::session::AuthState;

fn started(provider: InMemoryProvider) -> (IdentityClient, Arc<InMemoryProvider>) {
    let provider = Arc::new(provider);
    let client = IdentityClient::from_arc(provider.clone());
    client.start();
    (client, provider)
}

#[tokio::test]
async fn test_splash_until_started() {
    let client = IdentityClient::new(InMemoryProvider::new());
    let mut sub = client.subscribe();
    assert_eq!(sub.current(), AuthState::Initializing);
    assert_eq!(ScreenGraph::for_state(&sub.current()), ScreenGraph::Splash);

    client.start();
    assert_eq!(sub.changed().await, Some(AuthState::SignedOut));

    let nav = Navigator::new(&client.state());
    assert_eq!(nav.current(), Some(Screen::Login));
}

#[tokio::test]
async fn test_empty_fields_never_reach_provider() {
    let (client, provider) = started(InMemoryProvider::new());

    for (email, password) in [("", "secret"), ("a@b.co", ""), ("", "")] {
        let err = assert_err!(client.sign_in(email, password).await);
        assert_eq!(err, AuthError::MissingFields);
        assert_eq!(auth_notice(AuthOperation::SignIn, &err), "Please fill in all fields");

        let err = assert_err!(client.register(email, password).await);
        assert_eq!(auth_notice(AuthOperation::Register, &err), "Please fill in all fields");
    }

    assert_eq!(provider.call_count(), 0);
    assert_eq!(client.state(), AuthState::SignedOut);
}

#[tokio::test]
async fn test_sign_in_unlocks_authenticated_graph() {
    let (client, _) = started(InMemoryProvider::with_account("driver@example.com", "hunter22"));
    let mut nav = Navigator::new(&client.state());
    assert!(nav.navigate(Screen::Detect).is_err());

    let session = assert_ok!(client.sign_in("driver@example.com", "hunter22").await);
    assert_eq!(session.user.email, "driver@example.com");

    assert!(nav.apply(&client.state()));
    assert_eq!(nav.graph(), ScreenGraph::Authenticated);
    assert_eq!(nav.current(), Some(Screen::Home));
    assert_ok!(nav.navigate(Screen::Detect));
    assert_eq!(nav.current(), Some(Screen::Detect));

    // Signing out from Detect drops back to Login
    assert_ok!(client.sign_out().await);
    assert!(nav.apply(&client.state()));
    assert_eq!(nav.current(), Some(Screen::Login));
    assert_eq!(nav.depth(), 1);
    assert_eq!(nav.active_tab(), None);
}

#[tokio::test]
async fn test_wrong_password_keeps_signed_out() {
    let (client, _) = started(InMemoryProvider::with_account("driver@example.com", "hunter22"));

    let err = assert_err!(client.sign_in("driver@example.com", "nope").await);
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(auth_notice(AuthOperation::SignIn, &err), "Wrong username or password");
    assert_eq!(client.state(), AuthState::SignedOut);
}

#[tokio::test]
async fn test_register_existing_email() {
    let (client, _) = started(InMemoryProvider::with_account("driver@example.com", "hunter22"));
    let mut sub = client.subscribe();
    let _ = sub.current();

    let err = assert_err!(client.register("driver@example.com", "other-pass").await);
    assert_eq!(err, AuthError::EmailAlreadyInUse);
    assert_eq!(
        auth_notice(AuthOperation::Register, &err),
        "An account with this email already exists"
    );

    // No session change was published
    assert!(!sub.has_changed());
    assert_eq!(client.session(), None);
}

#[tokio::test]
async fn test_register_invalid_email() {
    let (client, _) = started(InMemoryProvider::new());
    let err = assert_err!(client.register("not-an-email", "hunter22").await);
    assert_eq!(err, AuthError::InvalidEmailFormat);
    assert_eq!(
        auth_notice(AuthOperation::Register, &err),
        "Please enter a valid email address"
    );
}

#[tokio::test]
async fn test_register_then_subscribers_see_session() {
    let (client, provider) = started(InMemoryProvider::new());
    let mut stream = client.subscribe().into_stream();

    // The stream yields the current state first
    assert_eq!(stream.next().await, Some(AuthState::SignedOut));

    assert_ok!(client.register("new@example.com", "hunter22").await);
    let next = stream.next().await;
    assert!(next.as_ref().is_some_and(AuthState::is_authenticated));
    assert_eq!(provider.account_count(), 1);

    let mut nav = Navigator::new(&client.state());
    assert_ok!(nav.select_tab(Tab::Account));
    assert_eq!(nav.current(), Some(Screen::Account));
}

#[tokio::test]
async fn test_cancelled_subscription_stops_observing() {
    let (client, _) = started(InMemoryProvider::with_account("driver@example.com", "hunter22"));
    let mut sub = client.subscribe();
    assert_eq!(client.subscriber_count(), 1);

    sub.cancel();
    assert!(!sub.is_active());
    assert_eq!(client.subscriber_count(), 0);

    assert_ok!(client.sign_in("driver@example.com", "hunter22").await);
    assert_eq!(sub.changed().await, None);
}
