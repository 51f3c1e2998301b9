//! In-memory implementation of every clinic repository port.
//!
//! One store backs identities, profiles and appointments so cross-table
//! rules (unique usernames, foreign keys, cascading ids) hold the same way
//! they do in PostgreSQL. State lives behind a single `Mutex`; a poisoned
//! lock surfaces as a query error rather than a panic.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    AppointmentRepository, AppointmentRepositoryError, DoctorRepository, DoctorRepositoryError,
    IdentityRepository, IdentityRepositoryError, PatientRepository, PatientRepositoryError,
    RegisteredIdentity,
};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentScope, Caller, DirectorySearch,
    Doctor, DoctorId, EmailAddress, Identity, IdentityId, NewAppointment, NewDoctorProfile,
    NewIdentity, NewPatientProfile, NewProfile, PasswordHash, Patient, PatientId, Role,
    StoredCredentials, Username,
};

const POISONED: &str = "in-memory store lock poisoned";

struct IdentityRecord {
    identity: Identity,
    password_hash: PasswordHash,
}

#[derive(Default)]
struct StoreState {
    identities: BTreeMap<i64, IdentityRecord>,
    patients: BTreeMap<i64, (IdentityId, NewPatientProfile)>,
    doctors: BTreeMap<i64, (IdentityId, NewDoctorProfile)>,
    appointments: BTreeMap<i64, Appointment>,
    last_identity: i64,
    last_patient: i64,
    last_doctor: i64,
    last_appointment: i64,
}

impl StoreState {
    fn identity(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get(&id.get()).map(|record| &record.identity)
    }

    fn insert_identity(
        &mut self,
        identity: NewIdentity,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<IdentityId, IdentityRepositoryError> {
        let records = self.identities.values();
        for record in records {
            if record.identity.email == identity.email {
                return Err(IdentityRepositoryError::duplicate_email());
            }
            if record.identity.username == identity.username {
                return Err(IdentityRepositoryError::duplicate_username());
            }
        }
        self.last_identity += 1;
        let id = IdentityId::new(self.last_identity);
        self.identities.insert(
            id.get(),
            IdentityRecord {
                identity: Identity {
                    id,
                    username: identity.username,
                    email: identity.email,
                    first_name: identity.first_name,
                    last_name: identity.last_name,
                    created_at,
                },
                password_hash: identity.password_hash,
            },
        );
        Ok(id)
    }

    fn patient(&self, id: i64) -> Option<Patient> {
        let (identity_id, profile) = self.patients.get(&id)?;
        let identity = self.identity(*identity_id)?;
        Some(Patient {
            id: PatientId::new(id),
            identity_id: *identity_id,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            date_of_birth: profile.date_of_birth,
            blood_type: profile.blood_type,
            phone: profile.phone.clone(),
        })
    }

    fn doctor(&self, id: i64) -> Option<Doctor> {
        let (identity_id, profile) = self.doctors.get(&id)?;
        let identity = self.identity(*identity_id)?;
        Some(Doctor {
            id: DoctorId::new(id),
            identity_id: *identity_id,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            specialization: profile.specialization,
            phone: profile.phone.clone(),
        })
    }

    fn check_references(
        &self,
        patient_id: PatientId,
        doctor_id: DoctorId,
    ) -> Result<(), AppointmentRepositoryError> {
        if !self.patients.contains_key(&patient_id.get()) {
            return Err(AppointmentRepositoryError::missing_reference(format!(
                "patient {patient_id}"
            )));
        }
        if !self.doctors.contains_key(&doctor_id.get()) {
            return Err(AppointmentRepositoryError::missing_reference(format!(
                "doctor {doctor_id}"
            )));
        }
        Ok(())
    }
}

/// Clinic data held in process memory.
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct InMemoryClinicStore {
    state: Arc<Mutex<StoreState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryClinicStore {
    /// Create an empty store. `clock` stamps `created_at` on new identities.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl IdentityRepository for InMemoryClinicStore {
    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, IdentityRepositoryError> {
        let state = self.lock().map_err(IdentityRepositoryError::query)?;
        Ok(state
            .identities
            .values()
            .any(|record| &record.identity.email == email))
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, IdentityRepositoryError> {
        let state = self.lock().map_err(IdentityRepositoryError::query)?;
        Ok(state
            .identities
            .values()
            .any(|record| &record.identity.username == username))
    }

    async fn register(
        &self,
        identity: NewIdentity,
        profile: NewProfile,
    ) -> Result<RegisteredIdentity, IdentityRepositoryError> {
        let created_at = self.clock.utc();
        let mut state = self.lock().map_err(IdentityRepositoryError::query)?;
        let identity_id = state.insert_identity(identity, created_at)?;
        let role = match profile {
            NewProfile::Patient(patient) => {
                state.last_patient += 1;
                let id = state.last_patient;
                state.patients.insert(id, (identity_id, patient));
                Role::Patient(PatientId::new(id))
            }
            NewProfile::Doctor(doctor) => {
                state.last_doctor += 1;
                let id = state.last_doctor;
                state.doctors.insert(id, (identity_id, doctor));
                Role::Doctor(DoctorId::new(id))
            }
        };
        Ok(RegisteredIdentity { identity_id, role })
    }

    async fn create_staff(
        &self,
        identity: NewIdentity,
    ) -> Result<IdentityId, IdentityRepositoryError> {
        let created_at = self.clock.utc();
        let mut state = self.lock().map_err(IdentityRepositoryError::query)?;
        state.insert_identity(identity, created_at)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, IdentityRepositoryError> {
        let state = self.lock().map_err(IdentityRepositoryError::query)?;
        Ok(state
            .identities
            .values()
            .find(|record| &record.identity.username == username)
            .map(|record| StoredCredentials {
                identity_id: record.identity.id,
                password_hash: record.password_hash.clone(),
            }))
    }

    async fn find_caller(&self, id: IdentityId) -> Result<Option<Caller>, IdentityRepositoryError> {
        let state = self.lock().map_err(IdentityRepositoryError::query)?;
        let Some(identity) = state.identity(id).cloned() else {
            return Ok(None);
        };
        let patient = state
            .patients
            .iter()
            .find(|(_, (owner, _))| *owner == id)
            .map(|(pid, _)| Role::Patient(PatientId::new(*pid)));
        let doctor = state
            .doctors
            .iter()
            .find(|(_, (owner, _))| *owner == id)
            .map(|(did, _)| Role::Doctor(DoctorId::new(*did)));
        let role = patient.or(doctor).unwrap_or(Role::Staff);
        Ok(Some(Caller { identity, role }))
    }
}

#[async_trait]
impl PatientRepository for InMemoryClinicStore {
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, PatientRepositoryError> {
        let state = self.lock().map_err(PatientRepositoryError::query)?;
        Ok(state.patient(id.get()))
    }

    async fn search(
        &self,
        search: &DirectorySearch,
    ) -> Result<Vec<Patient>, PatientRepositoryError> {
        let state = self.lock().map_err(PatientRepositoryError::query)?;
        Ok(state
            .patients
            .keys()
            .filter_map(|id| state.patient(*id))
            .filter(|patient| patient.matches(search))
            .collect())
    }

    async fn find_by_ids(&self, ids: &[PatientId]) -> Result<Vec<Patient>, PatientRepositoryError> {
        let state = self.lock().map_err(PatientRepositoryError::query)?;
        Ok(state
            .patients
            .keys()
            .filter(|id| ids.contains(&PatientId::new(**id)))
            .filter_map(|id| state.patient(*id))
            .collect())
    }
}

#[async_trait]
impl DoctorRepository for InMemoryClinicStore {
    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let state = self.lock().map_err(DoctorRepositoryError::query)?;
        Ok(state.doctor(id.get()))
    }

    async fn search(&self, search: &DirectorySearch) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        let state = self.lock().map_err(DoctorRepositoryError::query)?;
        Ok(state
            .doctors
            .keys()
            .filter_map(|id| state.doctor(*id))
            .filter(|doctor| doctor.matches(search))
            .collect())
    }

    async fn find_by_ids(&self, ids: &[DoctorId]) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        let state = self.lock().map_err(DoctorRepositoryError::query)?;
        Ok(state
            .doctors
            .keys()
            .filter(|id| ids.contains(&DoctorId::new(**id)))
            .filter_map(|id| state.doctor(*id))
            .collect())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryClinicStore {
    async fn find(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let state = self.lock().map_err(AppointmentRepositoryError::query)?;
        Ok(state.appointments.get(&id.get()).cloned())
    }

    async fn list(
        &self,
        scope: AppointmentScope,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let state = self.lock().map_err(AppointmentRepositoryError::query)?;
        let mut rows: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| scope.includes(appointment))
            .cloned()
            .collect();
        rows.sort_by_key(|appointment| (appointment.appointment_date, appointment.id.get()));
        Ok(rows)
    }

    async fn insert(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut state = self.lock().map_err(AppointmentRepositoryError::query)?;
        state.check_references(appointment.patient_id, appointment.doctor_id)?;
        state.last_appointment += 1;
        let stored = Appointment {
            id: AppointmentId::new(state.last_appointment),
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            appointment_date: appointment.appointment_date,
            reason: appointment.reason,
        };
        state.appointments.insert(stored.id.get(), stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: AppointmentId,
        draft: AppointmentDraft,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut state = self.lock().map_err(AppointmentRepositoryError::query)?;
        let Some(patient_id) = state.appointments.get(&id.get()).map(|a| a.patient_id) else {
            return Ok(None);
        };
        state.check_references(patient_id, draft.doctor_id)?;
        let Some(stored) = state.appointments.get_mut(&id.get()) else {
            return Ok(None);
        };
        stored.doctor_id = draft.doctor_id;
        stored.appointment_date = draft.appointment_date;
        stored.reason = draft.reason;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: AppointmentId) -> Result<bool, AppointmentRepositoryError> {
        let mut state = self.lock().map_err(AppointmentRepositoryError::query)?;
        Ok(state.appointments.remove(&id.get()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AppointmentReason, BloodType, PersonName, PhoneNumber, Specialization,
    };
    use chrono::{DateTime, Local, NaiveDate, Utc};
    use rstest::{fixture, rstest};

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
                .expect("fixture timestamp")
                .with_timezone(&Utc)
        }
    }

    #[fixture]
    fn store() -> InMemoryClinicStore {
        InMemoryClinicStore::new(Arc::new(FixtureClock))
    }

    fn identity(username: &str, email: &str) -> NewIdentity {
        NewIdentity {
            username: Username::new(username).expect("username"),
            email: EmailAddress::new(email).expect("email"),
            first_name: PersonName::new("Ada").expect("first"),
            last_name: PersonName::new("Lovelace").expect("last"),
            password_hash: PasswordHash::new("$argon2id$fixture"),
        }
    }

    fn patient_profile() -> NewProfile {
        NewProfile::Patient(NewPatientProfile {
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("dob"),
            blood_type: BloodType::OPositive,
            phone: PhoneNumber::new("555-0100").expect("phone"),
        })
    }

    fn doctor_profile() -> NewProfile {
        NewProfile::Doctor(NewDoctorProfile {
            specialization: Specialization::Cardiology,
            phone: PhoneNumber::new("555-0199").expect("phone"),
        })
    }

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("timestamp")
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected(store: InMemoryClinicStore) {
        store
            .register(identity("ada", "ada@example.com"), patient_profile())
            .await
            .expect("first registration");
        let err = store
            .register(identity("ada2", "ada@example.com"), patient_profile())
            .await
            .expect_err("duplicate email");
        assert_eq!(err, IdentityRepositoryError::DuplicateEmail);
        assert!(
            store
                .find_credentials(&Username::new("ada2").expect("username"))
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn callers_resolve_their_role(store: InMemoryClinicStore) {
        let patient = store
            .register(identity("pat", "pat@example.com"), patient_profile())
            .await
            .expect("patient");
        let doctor = store
            .register(identity("doc", "doc@example.com"), doctor_profile())
            .await
            .expect("doctor");
        let staff = store
            .create_staff(identity("admin", "admin@example.com"))
            .await
            .expect("staff");

        let role = |caller: Option<Caller>| caller.expect("caller").role;
        assert_eq!(role(store.find_caller(patient.identity_id).await.expect("p")), patient.role);
        assert_eq!(role(store.find_caller(doctor.identity_id).await.expect("d")), doctor.role);
        assert_eq!(role(store.find_caller(staff).await.expect("s")), Role::Staff);
        assert!(
            store
                .find_caller(IdentityId::new(99))
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn appointments_list_in_date_order(store: InMemoryClinicStore) {
        let patient = store
            .register(identity("pat", "pat@example.com"), patient_profile())
            .await
            .expect("patient");
        let doctor = store
            .register(identity("doc", "doc@example.com"), doctor_profile())
            .await
            .expect("doctor");
        let (Role::Patient(patient_id), Role::Doctor(doctor_id)) = (patient.role, doctor.role)
        else {
            panic!("unexpected roles");
        };

        for (day, hour) in [(9, 14), (2, 10), (9, 8)] {
            store
                .insert(NewAppointment {
                    patient_id,
                    doctor_id,
                    appointment_date: at(day, hour),
                    reason: AppointmentReason::new("Check-up").expect("reason"),
                })
                .await
                .expect("insert");
        }

        let listed = store
            .list(AppointmentScope::Doctor(doctor_id))
            .await
            .expect("list");
        let dates: Vec<_> = listed.iter().map(|a| a.appointment_date).collect();
        assert_eq!(dates, vec![at(2, 10), at(9, 8), at(9, 14)]);
        assert!(
            store
                .list(AppointmentScope::Doctor(DoctorId::new(42)))
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_doctor_is_a_missing_reference(store: InMemoryClinicStore) {
        let patient = store
            .register(identity("pat", "pat@example.com"), patient_profile())
            .await
            .expect("patient");
        let Role::Patient(patient_id) = patient.role else {
            panic!("expected patient");
        };
        let err = store
            .insert(NewAppointment {
                patient_id,
                doctor_id: DoctorId::new(7),
                appointment_date: at(1, 9),
                reason: AppointmentReason::new("Rash").expect("reason"),
            })
            .await
            .expect_err("missing doctor");
        assert!(matches!(
            err,
            AppointmentRepositoryError::MissingReference { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_a_row_existed(store: InMemoryClinicStore) {
        assert!(!store.delete(AppointmentId::new(1)).await.expect("delete"));
    }
}
