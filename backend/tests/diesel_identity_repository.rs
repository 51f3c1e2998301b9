//! Integration tests for `DieselIdentityRepository` against embedded PostgreSQL.
//!
//! Registration must write the identity and its profile together or not at
//! all; uniqueness and role resolution come from the real schema.

#[path = "support/postgres.rs"]
mod postgres;

use chrono::NaiveDate;
use clinic::domain::ports::{IdentityRepository, IdentityRepositoryError};
use clinic::domain::{
    BloodType, EmailAddress, NewPatientProfile, NewProfile, PhoneNumber, Role, Specialization,
    Username,
};
use clinic::outbound::persistence::DieselIdentityRepository;
use postgres::{PgContext, new_identity, pg_context, register_doctor, register_patient};
use rstest::{fixture, rstest};

#[fixture]
fn context() -> Option<PgContext> {
    pg_context()
}

fn repository(context: &PgContext) -> DieselIdentityRepository {
    DieselIdentityRepository::new(context.pool.clone())
}

fn patient_profile() -> NewProfile {
    NewProfile::Patient(NewPatientProfile {
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("date"),
        blood_type: BloodType::OPositive,
        phone: PhoneNumber::new("555-1111").expect("phone"),
    })
}

fn username_taken(context: &PgContext, raw: &str) -> bool {
    let username = Username::new(raw).expect("valid username");
    context
        .block_on(repository(context).username_taken(&username))
        .expect("username lookup")
}

#[rstest]
fn registered_profiles_resolve_to_their_roles(context: Option<PgContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: registered_profiles_resolve_to_their_roles skipped");
        return;
    };
    let patient_id = register_patient(&context, "alice", "Alice");
    let doctor_id = register_doctor(&context, "house", "House", Specialization::Cardiology);
    let repository = repository(&context);

    let alice = Username::new("alice").expect("username");
    let credentials = context
        .block_on(repository.find_credentials(&alice))
        .expect("credentials lookup")
        .expect("alice has credentials");
    assert_eq!(credentials.password_hash.as_ref(), "$argon2id$fixture");

    let caller = context
        .block_on(repository.find_caller(credentials.identity_id))
        .expect("caller lookup")
        .expect("alice exists");
    assert_eq!(caller.role, Role::Patient(patient_id));
    assert_eq!(caller.identity.email.as_ref(), "alice@x.com");

    let house = Username::new("house").expect("username");
    let house_id = context
        .block_on(repository.find_credentials(&house))
        .expect("credentials lookup")
        .expect("house has credentials")
        .identity_id;
    let caller = context
        .block_on(repository.find_caller(house_id))
        .expect("caller lookup")
        .expect("house exists");
    assert_eq!(caller.role, Role::Doctor(doctor_id));
}

#[rstest]
fn failing_profile_insert_leaves_no_identity(context: Option<PgContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: failing_profile_insert_leaves_no_identity skipped");
        return;
    };
    context.execute(
        "ALTER TABLE patients ADD CONSTRAINT patients_reject_inserts CHECK (false) NOT VALID",
    );

    let alice = new_identity("alice", "Alice", "Smith");

    let error = context
        .block_on(repository(&context).register(alice, patient_profile()))
        .expect_err("profile insert rejected");

    assert!(
        matches!(error, IdentityRepositoryError::Query { .. }),
        "unexpected error: {error:?}"
    );
    assert!(!username_taken(&context, "alice"));
    let email = EmailAddress::new("alice@x.com").expect("email");
    assert!(
        !context
            .block_on(repository(&context).email_taken(&email))
            .expect("email lookup")
    );
}

#[rstest]
#[case::email("bob", "alice", IdentityRepositoryError::DuplicateEmail)]
#[case::username("alice", "bob", IdentityRepositoryError::DuplicateUsername)]
fn unique_constraints_name_the_field(
    context: Option<PgContext>,
    #[case] username: &str,
    #[case] email_local_part: &str,
    #[case] expected: IdentityRepositoryError,
) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: unique_constraints_name_the_field skipped");
        return;
    };
    register_patient(&context, "alice", "Alice");
    let mut identity = new_identity(username, "Bob", "Jones");
    identity.email = EmailAddress::new(format!("{email_local_part}@x.com")).expect("email");

    let error = context
        .block_on(repository(&context).register(identity, patient_profile()))
        .expect_err("duplicate rejected");

    assert_eq!(error, expected);
    assert!(!username_taken(&context, "bob"));
}

#[rstest]
fn staff_identities_have_no_profile(context: Option<PgContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: staff_identities_have_no_profile skipped");
        return;
    };
    let repository = repository(&context);

    let id = context
        .block_on(repository.create_staff(new_identity("cuddy", "Lisa", "Cuddy")))
        .expect("staff created");
    let caller = context
        .block_on(repository.find_caller(id))
        .expect("caller lookup")
        .expect("staff exists");

    assert_eq!(caller.role, Role::Staff);
    assert!(username_taken(&context, "cuddy"));
}
