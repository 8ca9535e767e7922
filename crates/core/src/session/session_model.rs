//! Session domain models: user identity, auth events and auth errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ValidationError;

/// Identifier assigned to a user by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Trims the raw id; blank ids are rejected.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField("user_id".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Sign-in/sign-out transitions published by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(UserId),
    SignedOut,
}

/// Failures raised by the auth provider, each with its own user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password too weak")]
    WeakPassword,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("not signed in")]
    Unauthorized,

    #[error("auth provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Maps a provider error code (e.g. `auth/email-already-in-use`).
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthError::EmailAlreadyRegistered,
            "auth/invalid-email" => AuthError::InvalidEmail,
            "auth/weak-password" => AuthError::WeakPassword,
            "auth/wrong-password"
            | "auth/user-not-found"
            | "auth/invalid-credential"
            | "auth/invalid-login-credentials" => AuthError::InvalidCredentials,
            other => AuthError::Provider(other.to_string()),
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::EmailAlreadyRegistered => "Email is already registered",
            AuthError::InvalidEmail => "Invalid email address",
            AuthError::WeakPassword => "Password is too weak",
            AuthError::PasswordMismatch => "Passwords do not match",
            AuthError::Unauthorized => "Please sign in to continue",
            AuthError::Provider(_) => "Something went wrong. Please try again.",
        }
    }
}
