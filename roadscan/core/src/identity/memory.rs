//! In-Memory Identity Provider
//!
//! Accounts live in a process-local table and vanish on exit. Used for
//! offline development and as the default when no Firebase key is set.
//!
//! Email validation mirrors what hosted providers reject: a single `@`
//! with a non-empty local part and a dotted domain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use super::error::AuthError;
use super::traits::{Credentials, IdentityProvider};
use crate::session::{Session, UserHandle};

struct Account {
    uid: String,
    password: String,
}

/// Process-local identity provider
#[derive(Default)]
pub struct InMemoryProvider {
    /// Accounts keyed by email
    accounts: Mutex<HashMap<String, Account>>,
    /// Provider calls made (sign-in + register)
    calls: AtomicUsize,
}

impl InMemoryProvider {
    /// Create an empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with one pre-registered account
    #[must_use]
    pub fn with_account(email: &str, password: &str) -> Self {
        let provider = Self::new();
        provider.accounts.lock().insert(
            email.to_string(),
            Account {
                uid: Uuid::new_v4().to_string(),
                password: password.to_string(),
            },
        );
        provider
    }

    /// Number of sign-in/register calls that reached the provider
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of registered accounts
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }

    fn session_for(email: &str, account: &Account) -> Session {
        Session::new(UserHandle {
            uid: account.uid.clone(),
            email: email.to_string(),
            id_token: String::new(),
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

#[async_trait]
impl IdentityProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "In-memory"
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !is_valid_email(credentials.email()) {
            return Err(AuthError::InvalidEmailFormat);
        }

        let accounts = self.accounts.lock();
        match accounts.get(credentials.email()) {
            Some(account) if account.password == credentials.password() => {
                Ok(Self::session_for(credentials.email(), account))
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !is_valid_email(credentials.email()) {
            return Err(AuthError::InvalidEmailFormat);
        }

        let mut accounts = self.accounts.lock();
        if accounts.contains_key(credentials.email()) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let account = Account {
            uid: Uuid::new_v4().to_string(),
            password: credentials.password().to_string(),
        };
        let session = Self::session_for(credentials.email(), &account);
        accounts.insert(credentials.email().to_string(), account);
        Ok(session)
    }
}
