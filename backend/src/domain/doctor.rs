//! Doctor profile records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{IdentityId, PersonName, PhoneNumber};

/// Primary key of a doctor profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(i64);

impl DoctorId {
    /// Wrap a raw database key.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database key.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Medical specialization offered by a doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialization {
    Cardiology,
    Dermatology,
    Endocrinology,
    Gastroenterology,
    GeneralPractice,
    Neurology,
    Oncology,
    Pediatrics,
    Psychiatry,
    Radiology,
    Surgery,
    Urology,
}

/// Error returned when a specialization label is not a known choice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("specialization must be one of the listed choices")]
pub struct UnknownSpecialization;

impl Specialization {
    /// Every choice in display order.
    pub const ALL: [Self; 12] = [
        Self::Cardiology,
        Self::Dermatology,
        Self::Endocrinology,
        Self::Gastroenterology,
        Self::GeneralPractice,
        Self::Neurology,
        Self::Oncology,
        Self::Pediatrics,
        Self::Psychiatry,
        Self::Radiology,
        Self::Surgery,
        Self::Urology,
    ];

    /// Stored and displayed label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cardiology => "Cardiology",
            Self::Dermatology => "Dermatology",
            Self::Endocrinology => "Endocrinology",
            Self::Gastroenterology => "Gastroenterology",
            Self::GeneralPractice => "General Practice",
            Self::Neurology => "Neurology",
            Self::Oncology => "Oncology",
            Self::Pediatrics => "Pediatrics",
            Self::Psychiatry => "Psychiatry",
            Self::Radiology => "Radiology",
            Self::Surgery => "Surgery",
            Self::Urology => "Urology",
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialization {
    type Err = UnknownSpecialization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|choice| choice.as_str() == trimmed)
            .ok_or(UnknownSpecialization)
    }
}

/// Doctor profile joined with the owning identity's names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: DoctorId,
    pub identity_id: IdentityId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub specialization: Specialization,
    pub phone: PhoneNumber,
}

impl Doctor {
    /// `"Dr. <first> <last>"`.
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

/// Doctor-specific registration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoctorProfile {
    pub specialization: Specialization,
    pub phone: PhoneNumber,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Cardiology", Specialization::Cardiology)]
    #[case("General Practice", Specialization::GeneralPractice)]
    #[case(" Urology ", Specialization::Urology)]
    fn parses_known_labels(#[case] raw: &str, #[case] expected: Specialization) {
        assert_eq!(raw.parse::<Specialization>(), Ok(expected));
    }

    #[rstest]
    #[case("cardiology")]
    #[case("Dentistry")]
    #[case("")]
    fn rejects_unknown_labels(#[case] raw: &str) {
        assert_eq!(raw.parse::<Specialization>(), Err(UnknownSpecialization));
    }

    #[test]
    fn display_name_has_title() {
        let doctor = Doctor {
            id: DoctorId::new(1),
            identity_id: IdentityId::new(2),
            first_name: PersonName::new("Lisa").expect("first"),
            last_name: PersonName::new("Cuddy").expect("last"),
            specialization: Specialization::Endocrinology,
            phone: PhoneNumber::new("555-0000").expect("phone"),
        };
        assert_eq!(doctor.display_name(), "Dr. Lisa Cuddy");
    }
}
