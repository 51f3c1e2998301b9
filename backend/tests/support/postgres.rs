//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Each context boots a `pg-embed-setup-unpriv` cluster, creates a uniquely
//! named database, applies the crate's own migrations and hands out a small
//! pool. Set `SKIP_TEST_CLUSTER=1` to skip the suites where no cluster can
//! start.

use chrono::NaiveDate;
use clinic::domain::ports::IdentityRepository;
use clinic::domain::{
    BloodType, DoctorId, EmailAddress, NewDoctorProfile, NewIdentity, NewPatientProfile,
    NewProfile, PasswordHash, PatientId, PersonName, PhoneNumber, Role, Specialization, Username,
};
use clinic::outbound::persistence::{DbPool, DieselIdentityRepository, PoolConfig, run_migrations};
use diesel::{Connection, PgConnection, RunQueryDsl};
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// A migrated database plus the runtime used to drive async adapters.
pub struct PgContext {
    runtime: Runtime,
    pub pool: DbPool,
    database_url: String,
    _cluster: TestCluster,
}

impl PgContext {
    /// Run `future` to completion on the context runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Run raw SQL against the test database, outside any pool.
    pub fn execute(&self, sql: &str) {
        let mut conn = PgConnection::establish(&self.database_url).expect("connect for raw SQL");
        diesel::sql_query(sql)
            .execute(&mut conn)
            .unwrap_or_else(|err| panic!("raw SQL failed: {sql}: {err}"));
    }
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn create_database(cluster: &TestCluster) -> Result<String, String> {
    let name = format!("clinic_test_{}", Uuid::new_v4().simple());
    let admin_url = cluster.connection().database_url("postgres");
    let mut conn = PgConnection::establish(&admin_url).map_err(|err| err.to_string())?;
    diesel::sql_query(format!("CREATE DATABASE \"{name}\""))
        .execute(&mut conn)
        .map_err(|err| err.to_string())?;
    Ok(cluster.connection().database_url(&name))
}

fn setup() -> Result<PgContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = TestCluster::new().map_err(|err| format!("{err:?}"))?;
    let database_url = create_database(&cluster)?;
    runtime
        .block_on(run_migrations(&database_url))
        .map_err(|err| err.to_string())?;
    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    Ok(PgContext {
        runtime,
        pool,
        database_url,
        _cluster: cluster,
    })
}

/// A fresh migrated database, or `None` when the cluster cannot start and
/// `SKIP_TEST_CLUSTER` is set.
pub fn pg_context() -> Option<PgContext> {
    match setup() {
        Ok(context) => Some(context),
        Err(reason) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
    }
}

/// Account fields for `username` with a fixed password hash.
pub fn new_identity(username: &str, first_name: &str, last_name: &str) -> NewIdentity {
    NewIdentity {
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(format!("{username}@x.com")).expect("valid email"),
        first_name: PersonName::new(first_name).expect("valid first name"),
        last_name: PersonName::new(last_name).expect("valid last name"),
        password_hash: PasswordHash::new("$argon2id$fixture"),
    }
}

/// Register a patient through the Diesel identity adapter.
pub fn register_patient(context: &PgContext, username: &str, first_name: &str) -> PatientId {
    let repository = DieselIdentityRepository::new(context.pool.clone());
    let profile = NewProfile::Patient(NewPatientProfile {
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("date"),
        blood_type: BloodType::OPositive,
        phone: PhoneNumber::new("555-1111").expect("phone"),
    });
    let registered = context
        .block_on(repository.register(new_identity(username, first_name, "Smith"), profile))
        .expect("register patient");
    match registered.role {
        Role::Patient(id) => id,
        other => panic!("expected a patient role, got {other:?}"),
    }
}

/// Register a doctor through the Diesel identity adapter.
pub fn register_doctor(
    context: &PgContext,
    username: &str,
    last_name: &str,
    specialization: Specialization,
) -> DoctorId {
    let repository = DieselIdentityRepository::new(context.pool.clone());
    let profile = NewProfile::Doctor(NewDoctorProfile {
        specialization,
        phone: PhoneNumber::new("555-2222").expect("phone"),
    });
    let registered = context
        .block_on(repository.register(new_identity(username, "Greg", last_name), profile))
        .expect("register doctor");
    match registered.role {
        Role::Doctor(id) => id,
        other => panic!("expected a doctor role, got {other:?}"),
    }
}
