//! Identity Provider Traits
//!
//! The provider owns credential storage and verification. roadscan only
//! forwards what the user typed and keeps the resulting session.

use async_trait::async_trait;

use super::error::AuthError;
use crate::session::Session;

/// Email/password pair from the login form
///
/// Construction fails when either field is empty, so a `Credentials` value
/// is always safe to hand to a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Validate and build credentials
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, AuthError> {
        let email = email.into();
        let password = password.into();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        Ok(Self { email, password })
    }

    /// The identifier
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The secret
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication provider trait
///
/// Implement this trait to add support for a different identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logs (e.g., "Firebase")
    fn name(&self) -> &str;

    /// Verify credentials and open a session
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Create an account and open a session for it
    async fn register(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Tell the provider the session is over
    ///
    /// Token-based providers have nothing to revoke client-side, so the
    /// default does nothing.
    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Identity provider selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderConfig {
    /// Firebase Identity Toolkit
    Firebase {
        /// Web API key of the Firebase project
        api_key: String,
        /// Override for the REST base URL (emulators, tests)
        base_url: Option<String>,
    },
    /// Process-local accounts
    InMemory,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::InMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_reject_empty_fields() {
        assert_eq!(Credentials::new("", "secret"), Err(AuthError::MissingFields));
        assert_eq!(
            Credentials::new("a@b.co", ""),
            Err(AuthError::MissingFields)
        );
        assert_eq!(Credentials::new("", ""), Err(AuthError::MissingFields));
        assert!(Credentials::new("a@b.co", "secret").is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.co", "hunter22").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("a@b.co"));
        assert!(!debug.contains("hunter22"));
    }
}
