//! Login credentials.
//!
//! The login form is parsed into [`LoginCredentials`] before a handler talks
//! to the [`LoginService`](crate::domain::ports::LoginService) port.

use zeroize::Zeroizing;

use super::{Error, FieldErrorCode, FieldErrors};

/// Reasons a login form is rejected before any lookup happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was missing or empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl LoginValidationError {
    /// Form field the error belongs to.
    pub const fn field(self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }
}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        let mut errors = FieldErrors::default();
        errors.push(value.field(), FieldErrorCode::Required, value.to_string());
        errors.into_error()
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace. It is
///   zeroed when dropped.
///
/// # Examples
/// ```
/// use clinic::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "pw123").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert_eq!(creds.password(), "pw123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the credential lookup.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plain-text password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("alice", "", LoginValidationError::EmptyPassword)]
    fn rejects_missing_parts(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("alice", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[test]
    fn converts_into_field_error() {
        let err: Error = LoginValidationError::EmptyPassword.into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({
                "fields": [{
                    "field": "password",
                    "code": "required",
                    "message": "password must not be empty"
                }]
            }))
        );
    }
}
