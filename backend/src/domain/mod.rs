//! Domain primitives, services and ports.
//!
//! Purpose: define the clinic's strongly typed records (identities, patient
//! and doctor profiles, appointments) and the use-case services that operate
//! on them through the traits in [`ports`]. Nothing in this module depends on
//! Actix or Diesel.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`RegistrationService`], [`IdentityService`], [`AppointmentService`] and
//!   [`DirectoryService`]: use-case implementations of the driving ports.

pub mod appointment;
pub mod appointment_service;
pub mod auth;
pub mod directory;
pub mod doctor;
pub mod error;
pub mod identity;
pub mod identity_service;
pub mod patient;
pub mod ports;
pub mod profile;
pub mod registration;
pub mod trace_id;
pub mod validation;

pub use self::appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentReason, AppointmentScope,
    AppointmentSummary, EmptyReason, MISSING_DATE_MESSAGE, MISSING_TIME_MESSAGE, NewAppointment,
    ScheduleError, merge_schedule,
};
pub use self::appointment_service::{
    AppointmentService, CANCEL_FORBIDDEN_MESSAGE, CANCELLED_MESSAGE, EDIT_FORBIDDEN_MESSAGE,
    PATIENT_ONLY_MESSAGE, UPDATED_MESSAGE,
};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::directory::{DirectorySearch, DirectoryService};
pub use self::doctor::{Doctor, DoctorId, NewDoctorProfile, Specialization, UnknownSpecialization};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{
    Caller, EmailAddress, Identity, IdentityId, IdentityValidationError, NewIdentity,
    PasswordHash, PersonName, Role, StoredCredentials, Username,
};
pub use self::identity_service::IdentityService;
pub use self::patient::{BloodType, NewPatientProfile, Patient, PatientId, UnknownBloodType};
pub use self::profile::{NewProfile, PhoneNumber, PhoneValidationError};
pub use self::registration::{
    EMAIL_TAKEN_MESSAGE, PASSWORD_MISMATCH_MESSAGE, RegistrationService, USERNAME_TAKEN_MESSAGE,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::validation::{FieldError, FieldErrorCode, FieldErrors, REQUIRED_MESSAGE};
