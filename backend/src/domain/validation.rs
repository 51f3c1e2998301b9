//! Accumulator for form field errors.
//!
//! Form workflows report every failing field at once. Collect failures in a
//! [`FieldErrors`] and convert the result into one `invalid_request` error
//! whose details list each field.

use serde::Serialize;
use serde_json::json;

use super::Error;

/// Message used for every missing required field.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Machine-readable reason a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    Invalid,
    Mismatch,
    Duplicate,
    NotFound,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: FieldErrorCode,
    pub message: String,
}

/// Ordered collection of field errors.
///
/// # Examples
/// ```
/// use clinic::domain::{ErrorCode, FieldErrorCode, FieldErrors};
///
/// let mut errors = FieldErrors::default();
/// errors.push("email", FieldErrorCode::Duplicate, "This email address is already registered");
/// let err = errors.into_result().unwrap_err();
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, code: FieldErrorCode, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            code,
            message: message.into(),
        });
    }

    /// Record a missing required field.
    pub fn required(&mut self, field: &'static str) {
        self.push(field, FieldErrorCode::Required, REQUIRED_MESSAGE);
    }

    /// Return the trimmed value or record it as missing.
    pub fn require<'a>(&mut self, field: &'static str, value: Option<&'a str>) -> Option<&'a str> {
        match present(value) {
            Some(value) => Some(value),
            None => {
                self.required(field);
                None
            }
        }
    }

    /// Whether `field` already has an error.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing failed, otherwise an `invalid_request` error.
    pub fn into_result(self) -> Result<(), Error> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(self.into_error())
    }

    /// Convert into an `invalid_request` error listing every field.
    pub fn into_error(self) -> Error {
        let message = self
            .0
            .first()
            .map_or_else(|| "validation failed".to_owned(), |e| e.message.clone());
        Error::invalid_request(message).with_details(json!({ "fields": self.0 }))
    }
}

/// Trimmed value when present and not blank.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
