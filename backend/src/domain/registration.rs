//! Registration workflow for patients and doctors.
//!
//! Every field is validated before anything is written, and all failures are
//! reported together. The identity and its profile are then created in one
//! repository call, which adapters run inside a single transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::identity_service::{map_identity_error, run_hasher};
use crate::domain::ports::{
    AccountFields, CredentialHasher, DoctorFields, IdentityRepository, IdentityRepositoryError,
    PatientFields, ProfileFields, RegisteredIdentity, RegistrationCommand, RegistrationRequest,
};
use crate::domain::{
    BloodType, EmailAddress, Error, FieldErrorCode, FieldErrors, IdentityId, NewDoctorProfile,
    NewIdentity, NewPatientProfile, NewProfile, PersonName, PhoneNumber, Specialization, Username,
};

/// Message reported on `email` when the address belongs to another identity.
pub const EMAIL_TAKEN_MESSAGE: &str = "This email address is already registered";
/// Message reported on `username` when the name belongs to another identity.
pub const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";
/// Message reported on `confirm_password` when the two passwords differ.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match";

/// Account fields that passed validation.
struct ValidAccount {
    username: Username,
    email: EmailAddress,
    first_name: PersonName,
    last_name: PersonName,
    password: Zeroizing<String>,
}

/// Registration use-cases.
#[derive(Clone)]
pub struct RegistrationService<R, H> {
    identities: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> RegistrationService<R, H> {
    /// Create a new service. The clock bounds dates of birth.
    pub fn new(identities: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            identities,
            hasher,
            clock,
        }
    }
}

impl<R, H> RegistrationService<R, H>
where
    R: IdentityRepository,
    H: CredentialHasher + 'static,
{
    /// Create an identity without a profile. Such identities act as staff.
    pub async fn register_staff(&self, account: AccountFields) -> Result<IdentityId, Error> {
        let mut errors = FieldErrors::default();
        let valid = self.validate_account(&account, &mut errors).await?;
        let Some(valid) = valid.filter(|_| errors.is_empty()) else {
            return Err(errors.into_error());
        };

        let identity = self.new_identity(valid).await?;
        let id = self
            .identities
            .create_staff(identity)
            .await
            .map_err(map_registration_error)?;
        info!(identity_id = %id, "staff identity created");
        Ok(id)
    }

    async fn validate_account(
        &self,
        account: &AccountFields,
        errors: &mut FieldErrors,
    ) -> Result<Option<ValidAccount>, Error> {
        let username = errors
            .require("username", account.username.as_deref())
            .and_then(|raw| parse_field(errors, "username", Username::new(raw)));
        let first_name = errors
            .require("first_name", account.first_name.as_deref())
            .and_then(|raw| parse_field(errors, "first_name", PersonName::new(raw)));
        let last_name = errors
            .require("last_name", account.last_name.as_deref())
            .and_then(|raw| parse_field(errors, "last_name", PersonName::new(raw)));
        let email = errors
            .require("email", account.email.as_deref())
            .and_then(|raw| parse_field(errors, "email", EmailAddress::new(raw)));
        let password = required_secret(errors, "password", account.password.as_ref());
        let confirm = required_secret(
            errors,
            "confirm_password",
            account.confirm_password.as_ref(),
        );

        if let Some(email) = email.as_ref() {
            let taken = self
                .identities
                .email_taken(email)
                .await
                .map_err(map_identity_error)?;
            if taken {
                errors.push("email", FieldErrorCode::Duplicate, EMAIL_TAKEN_MESSAGE);
            }
        }
        if let Some(username) = username.as_ref() {
            let taken = self
                .identities
                .username_taken(username)
                .await
                .map_err(map_identity_error)?;
            if taken {
                errors.push("username", FieldErrorCode::Duplicate, USERNAME_TAKEN_MESSAGE);
            }
        }
        if let (Some(password), Some(confirm)) = (password, confirm)
            && password.as_str() != confirm.as_str()
        {
            errors.push(
                "confirm_password",
                FieldErrorCode::Mismatch,
                PASSWORD_MISMATCH_MESSAGE,
            );
        }

        Ok(match (username, email, first_name, last_name, password) {
            (Some(username), Some(email), Some(first_name), Some(last_name), Some(password)) => {
                Some(ValidAccount {
                    username,
                    email,
                    first_name,
                    last_name,
                    password: password.clone(),
                })
            }
            _ => None,
        })
    }

    async fn new_identity(&self, account: ValidAccount) -> Result<NewIdentity, Error> {
        let password = account.password;
        let password_hash =
            run_hasher(&self.hasher, move |hasher| hasher.hash(password.as_str())).await?;
        Ok(NewIdentity {
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash,
        })
    }

    fn validate_patient(
        &self,
        fields: &PatientFields,
        errors: &mut FieldErrors,
    ) -> Option<NewProfile> {
        let today = self.clock.local().date_naive();
        let date_of_birth = errors
            .require("date_of_birth", fields.date_of_birth.as_deref())
            .and_then(|raw| match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) if date <= today => Some(date),
                Ok(_) => {
                    errors.push(
                        "date_of_birth",
                        FieldErrorCode::Invalid,
                        "Date of birth cannot be in the future.",
                    );
                    None
                }
                Err(_) => {
                    errors.push(
                        "date_of_birth",
                        FieldErrorCode::Invalid,
                        "Enter a valid date (YYYY-MM-DD).",
                    );
                    None
                }
            });
        let blood_type = errors
            .require("blood_type", fields.blood_type.as_deref())
            .and_then(|raw| parse_field(errors, "blood_type", raw.parse::<BloodType>()));
        let phone = errors
            .require("phone", fields.phone.as_deref())
            .and_then(|raw| parse_field(errors, "phone", PhoneNumber::new(raw)));

        match (date_of_birth, blood_type, phone) {
            (Some(date_of_birth), Some(blood_type), Some(phone)) => {
                Some(NewProfile::Patient(NewPatientProfile {
                    date_of_birth,
                    blood_type,
                    phone,
                }))
            }
            _ => None,
        }
    }
}

fn validate_doctor(fields: &DoctorFields, errors: &mut FieldErrors) -> Option<NewProfile> {
    let specialization = errors
        .require("specialization", fields.specialization.as_deref())
        .and_then(|raw| parse_field(errors, "specialization", raw.parse::<Specialization>()));
    let phone = errors
        .require("phone", fields.phone.as_deref())
        .and_then(|raw| parse_field(errors, "phone", PhoneNumber::new(raw)));

    match (specialization, phone) {
        (Some(specialization), Some(phone)) => Some(NewProfile::Doctor(NewDoctorProfile {
            specialization,
            phone,
        })),
        _ => None,
    }
}

fn parse_field<T, E: std::fmt::Display>(
    errors: &mut FieldErrors,
    field: &'static str,
    result: Result<T, E>,
) -> Option<T> {
    result
        .map_err(|err| errors.push(field, FieldErrorCode::Invalid, err.to_string()))
        .ok()
}

fn required_secret<'a>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&'a Zeroizing<String>>,
) -> Option<&'a Zeroizing<String>> {
    let value = value.filter(|secret| !secret.trim().is_empty());
    if value.is_none() {
        errors.required(field);
    }
    value
}

/// Unique violations raced past the pre-checks; report them as field errors.
fn map_registration_error(err: IdentityRepositoryError) -> Error {
    let mut errors = FieldErrors::default();
    match err {
        IdentityRepositoryError::DuplicateEmail => {
            errors.push("email", FieldErrorCode::Duplicate, EMAIL_TAKEN_MESSAGE);
        }
        IdentityRepositoryError::DuplicateUsername => {
            errors.push("username", FieldErrorCode::Duplicate, USERNAME_TAKEN_MESSAGE);
        }
        other => return map_identity_error(other),
    }
    warn!("registration lost a uniqueness race");
    errors.into_error()
}

#[async_trait]
impl<R, H> RegistrationCommand for RegistrationService<R, H>
where
    R: IdentityRepository,
    H: CredentialHasher + 'static,
{
    async fn register(&self, request: RegistrationRequest) -> Result<RegisteredIdentity, Error> {
        let mut errors = FieldErrors::default();
        let account = self.validate_account(&request.account, &mut errors).await?;
        let profile = match &request.profile {
            ProfileFields::Patient(fields) => self.validate_patient(fields, &mut errors),
            ProfileFields::Doctor(fields) => validate_doctor(fields, &mut errors),
        };

        let (Some(account), Some(profile)) = (account, profile) else {
            return Err(errors.into_error());
        };
        errors.into_result()?;

        let identity = self.new_identity(account).await?;
        let registered = self
            .identities
            .register(identity, profile)
            .await
            .map_err(map_registration_error)?;
        info!(
            identity_id = %registered.identity_id,
            role = registered.role.label(),
            "identity registered"
        );
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCredentialHasher, MockIdentityRepository};
    use crate::domain::{ErrorCode, PasswordHash, PatientId, Role};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use serde_json::Value;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0)
                .single()
                .expect("valid fixture timestamp")
        }
    }

    fn secret(raw: &str) -> Option<Zeroizing<String>> {
        Some(Zeroizing::new(raw.to_owned()))
    }

    #[fixture]
    fn alice() -> RegistrationRequest {
        RegistrationRequest {
            account: AccountFields {
                username: Some("alice".to_owned()),
                first_name: Some("Alice".to_owned()),
                last_name: Some("Smith".to_owned()),
                email: Some("alice@x.com".to_owned()),
                password: secret("pw123"),
                confirm_password: secret("pw123"),
            },
            profile: ProfileFields::Patient(PatientFields {
                date_of_birth: Some("1990-01-01".to_owned()),
                blood_type: Some("O+".to_owned()),
                phone: Some("555-1111".to_owned()),
            }),
        }
    }

    fn free_repo() -> MockIdentityRepository {
        let mut repo = MockIdentityRepository::new();
        repo.expect_email_taken().returning(|_| Ok(false));
        repo.expect_username_taken().returning(|_| Ok(false));
        repo
    }

    fn service(
        repo: MockIdentityRepository,
        hasher: MockCredentialHasher,
    ) -> RegistrationService<MockIdentityRepository, MockCredentialHasher> {
        RegistrationService::new(Arc::new(repo), Arc::new(hasher), Arc::new(FixtureClock))
    }

    fn fields(err: &Error) -> Vec<(String, String)> {
        err.details()
            .and_then(|details| details.get("fields"))
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .map(|f| {
                        (
                            f["field"].as_str().unwrap_or_default().to_owned(),
                            f["message"].as_str().unwrap_or_default().to_owned(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[rstest]
    #[tokio::test]
    async fn registers_patient_in_one_call(alice: RegistrationRequest) {
        let mut repo = free_repo();
        repo.expect_register()
            .withf(|identity, profile| {
                identity.email.as_ref() == "alice@x.com"
                    && identity.password_hash.as_ref() == "hashed"
                    && matches!(
                        profile,
                        NewProfile::Patient(p) if p.blood_type == BloodType::OPositive
                    )
            })
            .times(1)
            .return_once(|_, _| {
                Ok(RegisteredIdentity {
                    identity_id: IdentityId::new(1),
                    role: Role::Patient(PatientId::new(1)),
                })
            });
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .withf(|password| password == "pw123")
            .return_once(|_| Ok(PasswordHash::new("hashed")));

        let registered = service(repo, hasher)
            .register(alice)
            .await
            .expect("registration succeeds");
        assert_eq!(registered.role, Role::Patient(PatientId::new(1)));
    }

    #[rstest]
    #[tokio::test]
    async fn mismatched_passwords_write_nothing(mut alice: RegistrationRequest) {
        alice.account.confirm_password = secret("pw124");
        let mut repo = free_repo();
        repo.expect_register().times(0);
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().times(0);

        let err = service(repo, hasher)
            .register(alice)
            .await
            .expect_err("mismatch rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            fields(&err),
            vec![(
                "confirm_password".to_owned(),
                PASSWORD_MISMATCH_MESSAGE.to_owned()
            )]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn taken_email_is_a_field_error(alice: RegistrationRequest) {
        let mut repo = MockIdentityRepository::new();
        repo.expect_email_taken()
            .withf(|email| email.as_ref() == "alice@x.com")
            .return_once(|_| Ok(true));
        repo.expect_username_taken().return_once(|_| Ok(false));
        repo.expect_register().times(0);

        let err = service(repo, MockCredentialHasher::new())
            .register(alice)
            .await
            .expect_err("duplicate rejected");
        assert_eq!(
            fields(&err),
            vec![("email".to_owned(), EMAIL_TAKEN_MESSAGE.to_owned())]
        );
    }

    #[tokio::test]
    async fn accumulates_every_missing_field() {
        let request = RegistrationRequest {
            account: AccountFields::default(),
            profile: ProfileFields::Doctor(DoctorFields::default()),
        };
        let mut repo = MockIdentityRepository::new();
        repo.expect_email_taken().times(0);
        repo.expect_username_taken().times(0);

        let err = service(repo, MockCredentialHasher::new())
            .register(request)
            .await
            .expect_err("empty form rejected");
        let names: Vec<String> = fields(&err).into_iter().map(|(field, _)| field).collect();
        assert_eq!(
            names,
            [
                "username",
                "first_name",
                "last_name",
                "email",
                "password",
                "confirm_password",
                "specialization",
                "phone",
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn whitespace_passwords_count_as_missing(mut alice: RegistrationRequest) {
        alice.account.password = secret("   ");
        alice.account.confirm_password = secret("\t ");
        let mut repo = free_repo();
        repo.expect_register().times(0);
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().times(0);

        let err = service(repo, hasher)
            .register(alice)
            .await
            .expect_err("blank passwords rejected");
        let names: Vec<String> = fields(&err).into_iter().map(|(field, _)| field).collect();
        assert_eq!(names, ["password", "confirm_password"]);
    }

    #[rstest]
    #[case(Some("2030-01-01"), "Date of birth cannot be in the future.")]
    #[case(Some("01/01/1990"), "Enter a valid date (YYYY-MM-DD).")]
    #[tokio::test]
    async fn rejects_bad_dates_of_birth(
        mut alice: RegistrationRequest,
        #[case] dob: Option<&str>,
        #[case] message: &str,
    ) {
        alice.profile = ProfileFields::Patient(PatientFields {
            date_of_birth: dob.map(str::to_owned),
            blood_type: Some("O+".to_owned()),
            phone: Some("555-1111".to_owned()),
        });
        let err = service(free_repo(), MockCredentialHasher::new())
            .register(alice)
            .await
            .expect_err("bad date rejected");
        assert_eq!(
            fields(&err),
            vec![("date_of_birth".to_owned(), message.to_owned())]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_email_reports_format_message(mut alice: RegistrationRequest) {
        alice.account.email = Some("not-an-email".to_owned());
        let mut repo = MockIdentityRepository::new();
        repo.expect_email_taken().times(0);
        repo.expect_username_taken().returning(|_| Ok(false));

        let err = service(repo, MockCredentialHasher::new())
            .register(alice)
            .await
            .expect_err("bad email rejected");
        let (field, message) = fields(&err).into_iter().next().expect("one field error");
        assert_eq!(field, "email");
        assert!(message.starts_with("Invalid email format."));
    }

    #[rstest]
    #[tokio::test]
    async fn uniqueness_race_is_reported_on_the_field(alice: RegistrationRequest) {
        let mut repo = free_repo();
        repo.expect_register()
            .return_once(|_, _| Err(IdentityRepositoryError::duplicate_username()));
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordHash::new("hashed")));

        let err = service(repo, hasher)
            .register(alice)
            .await
            .expect_err("race reported");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            fields(&err),
            vec![("username".to_owned(), USERNAME_TAKEN_MESSAGE.to_owned())]
        );
    }

    #[tokio::test]
    async fn staff_identity_has_no_profile() {
        let mut repo = free_repo();
        repo.expect_create_staff()
            .withf(|identity| identity.username.as_ref() == "admin")
            .return_once(|_| Ok(IdentityId::new(9)));
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordHash::new("hashed")));

        let account = AccountFields {
            username: Some("admin".to_owned()),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Admin".to_owned()),
            email: Some("admin@clinic.test".to_owned()),
            password: secret("s3cret"),
            confirm_password: secret("s3cret"),
        };
        let id = service(repo, hasher)
            .register_staff(account)
            .await
            .expect("staff created");
        assert_eq!(id, IdentityId::new(9));
    }
}
