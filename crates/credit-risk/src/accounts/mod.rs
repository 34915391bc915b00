//! Admin accounts: registration rules, password hashing and bearer-token sessions.

mod password;
mod tokens;

pub use password::{BcryptPasswordHasher, PasswordHashError, PasswordHasher};
pub use tokens::{SessionTokens, TokenAuthority};

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(pub i64);

/// Registered administrator. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    pub id: AdminId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Body of the register and login endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Credentials that passed registration rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
}

/// Authentication failures, all reported as 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid email/password")]
    InvalidCredentials,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern compiles")
    })
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    /// Applies registration rules, reporting the first failing field.
    pub fn validate_registration(&self) -> Result<Registration, ValidationError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ValidationError::new("email", "Email is required"))?;

        if email == "@" || !email_pattern().is_match(email) {
            return Err(ValidationError::new("email", "Email format is invalid"));
        }

        let password = self
            .password
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ValidationError::new("password", "Password is required"))?;

        if password.trim().is_empty() {
            return Err(ValidationError::new(
                "password",
                "Password must not contain only spaces",
            ));
        }

        let length = password.chars().count();
        if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&length) {
            return Err(ValidationError::new(
                "password",
                format!(
                    "Password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters"
                ),
            ));
        }

        Ok(Registration {
            email: email.to_ascii_lowercase(),
            password: password.to_string(),
        })
    }

    /// Login only requires both fields to be present.
    pub fn login_fields(&self) -> Result<(String, &str), ValidationError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ValidationError::new("email", "Email is required"))?;
        let password = self
            .password
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ValidationError::new("password", "Password is required"))?;
        Ok((email.to_ascii_lowercase(), password))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token)
}
