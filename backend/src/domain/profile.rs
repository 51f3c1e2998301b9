//! Values shared by patient and doctor profiles.

use std::fmt;

use super::{NewDoctorProfile, NewPatientProfile};

/// Maximum phone number length.
pub const PHONE_MAX: usize = 20;

/// Validation errors for [`PhoneNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneValidationError {
    #[error("phone must not be empty")]
    Empty,
    #[error("phone must be at most {max} characters")]
    TooLong { max: usize },
}

/// Free-form contact number, 1 to 20 characters once trimmed.
///
/// # Examples
/// ```
/// use clinic::domain::PhoneNumber;
///
/// assert_eq!(PhoneNumber::new(" 555-1111 ").unwrap().as_ref(), "555-1111");
/// assert!(PhoneNumber::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a phone number.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PhoneValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PhoneValidationError::Empty);
        }
        if trimmed.chars().count() > PHONE_MAX {
            return Err(PhoneValidationError::TooLong { max: PHONE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role profile created together with an identity at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewProfile {
    Patient(NewPatientProfile),
    Doctor(NewDoctorProfile),
}
