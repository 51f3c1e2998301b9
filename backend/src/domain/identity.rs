//! Identity model: the login account behind every patient, doctor and staff
//! member.
//!
//! Values arriving from forms are validated here before a service talks to a
//! port. Emails are normalised to lower case so uniqueness checks are
//! case-insensitive.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::{DoctorId, PatientId};

/// Maximum username length accepted at registration.
pub const USERNAME_MAX: usize = 150;
/// Maximum length of a first or last name.
pub const PERSON_NAME_MAX: usize = 150;
/// Maximum stored email length.
pub const EMAIL_MAX: usize = 254;

/// Validation errors for identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits and @/./+/-/_ characters",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(
                f,
                "Invalid email format. Please enter a valid email address (e.g., user@example.com)",
            ),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Primary key of an identity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(i64);

impl IdentityId {
    /// Wrap a raw database key.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database key.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login name, unique across identities.
///
/// # Examples
/// ```
/// use clinic::domain::Username;
///
/// let name = Username::new("  alice ").unwrap();
/// assert_eq!(name.as_ref(), "alice");
/// assert!(Username::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(IdentityValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
        if !trimmed.chars().all(allowed) {
            return Err(IdentityValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Syntactically valid, lower-cased email address.
///
/// # Examples
/// ```
/// use clinic::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Alice@X.com ").unwrap();
/// assert_eq!(email.as_ref(), "alice@x.com");
/// assert!(EmailAddress::new("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, trim and lower-case an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX || !normalised.validate_email() {
            return Err(IdentityValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// First or last name of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a trimmed name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyName);
        }
        if trimmed.chars().count() > PERSON_NAME_MAX {
            return Err(IdentityValidationError::NameTooLong {
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PersonName {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

/// Salted password hash in PHC string format.
///
/// `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded PHC string produced by a credential hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Stored identity without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: Username,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// `"<first> <last>"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile attached to an identity.
///
/// Registration always produces a patient or doctor; identities created by
/// the `create-staff` tool carry no profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Patient(PatientId),
    Doctor(DoctorId),
    Staff,
}

impl Role {
    /// Stable lower-case label used in payloads and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient(_) => "patient",
            Self::Doctor(_) => "doctor",
            Self::Staff => "staff",
        }
    }
}

/// Authenticated identity resolved from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: Identity,
    pub role: Role,
}

impl Caller {
    /// Patient id when the caller holds a patient profile.
    pub fn patient_id(&self) -> Option<PatientId> {
        match self.role {
            Role::Patient(id) => Some(id),
            _ => None,
        }
    }

    /// Name shown in greetings and listings.
    pub fn display_name(&self) -> String {
        match self.role {
            Role::Doctor(_) => format!("Dr. {}", self.identity.full_name()),
            Role::Patient(_) | Role::Staff => self.identity.full_name(),
        }
    }
}

/// Identity ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub username: Username,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password_hash: PasswordHash,
}

/// Credentials row used to verify a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub identity_id: IdentityId,
    pub password_hash: PasswordHash,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", IdentityValidationError::EmptyUsername)]
    #[case("   ", IdentityValidationError::EmptyUsername)]
    #[case("two words", IdentityValidationError::UsernameInvalidCharacters)]
    #[case("semi;colon", IdentityValidationError::UsernameInvalidCharacters)]
    fn rejects_bad_usernames(#[case] raw: &str, #[case] expected: IdentityValidationError) {
        assert_eq!(Username::new(raw).expect_err("invalid"), expected);
    }

    #[test]
    fn rejects_overlong_username() {
        let raw = "a".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(raw).expect_err("too long"),
            IdentityValidationError::UsernameTooLong { max: USERNAME_MAX }
        );
    }

    #[rstest]
    #[case("alice")]
    #[case("dr.who+1@clinic")]
    #[case("under_score-dash")]
    fn accepts_django_style_usernames(#[case] raw: &str) {
        assert_eq!(Username::new(raw).expect("valid").as_ref(), raw);
    }

    #[rstest]
    #[case("alice@x.com", "alice@x.com")]
    #[case("  Bob@Example.ORG ", "bob@example.org")]
    fn normalises_emails(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(EmailAddress::new(raw).expect("valid").as_ref(), expected);
    }

    #[rstest]
    #[case("", IdentityValidationError::EmptyEmail)]
    #[case("plainaddress", IdentityValidationError::InvalidEmail)]
    #[case("@missing-local.org", IdentityValidationError::InvalidEmail)]
    #[case("two@@x.com", IdentityValidationError::InvalidEmail)]
    fn rejects_bad_emails(#[case] raw: &str, #[case] expected: IdentityValidationError) {
        assert_eq!(EmailAddress::new(raw).expect_err("invalid"), expected);
    }

    #[test]
    fn invalid_email_message_guides_the_user() {
        assert_eq!(
            IdentityValidationError::InvalidEmail.to_string(),
            "Invalid email format. Please enter a valid email address (e.g., user@example.com)"
        );
    }

    #[test]
    fn person_name_is_trimmed_and_required() {
        assert_eq!(PersonName::new(" Alice ").expect("valid").as_ref(), "Alice");
        assert_eq!(
            PersonName::new(" ").expect_err("blank"),
            IdentityValidationError::EmptyName
        );
    }

    #[test]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert!(!format!("{hash:?}").contains("secret"));
    }

    fn identity() -> Identity {
        Identity {
            id: IdentityId::new(1),
            username: Username::new("gregory").expect("username"),
            email: EmailAddress::new("g@x.com").expect("email"),
            first_name: PersonName::new("Gregory").expect("first"),
            last_name: PersonName::new("House").expect("last"),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[rstest]
    #[case(Role::Doctor(DoctorId::new(1)), "Dr. Gregory House", None)]
    #[case(Role::Patient(PatientId::new(4)), "Gregory House", Some(PatientId::new(4)))]
    #[case(Role::Staff, "Gregory House", None)]
    fn caller_display_and_patient_id(
        #[case] role: Role,
        #[case] display: &str,
        #[case] patient: Option<PatientId>,
    ) {
        let caller = Caller {
            identity: identity(),
            role,
        };
        assert_eq!(caller.display_name(), display);
        assert_eq!(caller.patient_id(), patient);
    }
}
