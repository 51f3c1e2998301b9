//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the domain's driven ports on top of `diesel-async`
//! and a `bb8` pool. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; adapters only translate
//! between rows and domain records.
//!
//! # Example
//!
//! ```ignore
//! use clinic::outbound::persistence::{DbPool, DieselAppointmentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinic")).await?;
//! let appointments = DieselAppointmentRepository::new(pool);
//! ```

mod diesel_appointment_repository;
mod diesel_doctor_repository;
mod diesel_identity_repository;
mod diesel_patient_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use diesel_doctor_repository::DieselDoctorRepository;
pub use diesel_identity_repository::DieselIdentityRepository;
pub use diesel_patient_repository::DieselPatientRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
