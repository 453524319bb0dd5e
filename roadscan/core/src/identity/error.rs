//! Authentication Errors
//!
//! Provider error codes collapse into the few kinds the login form
//! distinguishes. Both the SDK-style codes (`auth/email-already-in-use`) and
//! the REST-style codes (`EMAIL_EXISTS`) are recognised.

use thiserror::Error;

/// Notice shown when a form field is left empty
pub const FILL_ALL_FIELDS_NOTICE: &str = "Please fill in all fields";

/// Errors from sign-in and registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Identifier or secret was empty; the provider was not called
    #[error("email and password are both required")]
    MissingFields,

    /// Wrong email/password combination or unknown account
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration with an email that already has an account
    #[error("email address is already in use")]
    EmailAlreadyInUse,

    /// The provider rejected the email format
    #[error("email address is badly formatted")]
    InvalidEmailFormat,

    /// Anything else the provider or the network reported
    #[error("authentication failed: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Map a provider error code to an error kind.
    ///
    /// REST codes may carry a detail suffix (`WEAK_PASSWORD : Password should
    /// be at least 6 characters`); only the part before the colon is matched.
    #[must_use]
    pub fn from_provider_code(code: &str) -> Self {
        let head = code.split(':').next().unwrap_or(code).trim();
        match head {
            "auth/email-already-in-use" | "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "auth/invalid-email" | "INVALID_EMAIL" => Self::InvalidEmailFormat,
            "auth/wrong-password"
            | "auth/user-not-found"
            | "auth/invalid-credential"
            | "INVALID_PASSWORD"
            | "EMAIL_NOT_FOUND"
            | "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredentials,
            _ => Self::Unknown(code.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unknown(err.to_string())
    }
}

/// Which form action produced an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthOperation {
    /// "Log In"
    SignIn,
    /// "Register"
    Register,
}

/// Short transient notice for an authentication failure
///
/// Any sign-in failure reads as a credential problem; registration
/// distinguishes the duplicate-email and bad-format cases.
#[must_use]
pub fn auth_notice(operation: AuthOperation, error: &AuthError) -> &'static str {
    if matches!(error, AuthError::MissingFields) {
        return FILL_ALL_FIELDS_NOTICE;
    }

    match operation {
        AuthOperation::SignIn => "Wrong username or password",
        AuthOperation::Register => match error {
            AuthError::EmailAlreadyInUse => "An account with this email already exists",
            AuthError::InvalidEmailFormat => "Please enter a valid email address",
            _ => "Registration failed, please try again",
        },
    }
}
