//! Patient profile records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{IdentityId, PersonName, PhoneNumber};

/// Primary key of a patient profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
    /// Wrap a raw database key.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database key.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BloodType {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

/// Error returned when a blood type label is not one of the known choices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("blood type must be one of A+, A-, B+, B-, AB+, AB-, O+, O-")]
pub struct UnknownBloodType;

impl BloodType {
    /// Every choice in display order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Stored and displayed label, e.g. `"AB-"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = UnknownBloodType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|choice| choice.as_str() == trimmed)
            .ok_or(UnknownBloodType)
    }
}

/// Patient profile joined with the owning identity's names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub identity_id: IdentityId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub date_of_birth: NaiveDate,
    pub blood_type: BloodType,
    pub phone: PhoneNumber,
}

impl Patient {
    /// `"<first> <last>"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Patient-specific registration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatientProfile {
    pub date_of_birth: NaiveDate,
    pub blood_type: BloodType,
    pub phone: PhoneNumber,
}
