//! Internal Diesel row structs and their conversions into domain records.
//!
//! Rows never leave the persistence layer. Conversions fail with a message
//! when stored data no longer satisfies a domain invariant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Appointment, AppointmentId, AppointmentReason, BloodType, Doctor, DoctorId, EmailAddress,
    Identity, IdentityId, Patient, PatientId, PersonName, PhoneNumber, Specialization, Username,
};

use super::schema::{appointments, doctors, identities, patients};

/// Row struct for reading identities.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdentityRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Names joined onto profile rows for listings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdentityNamesRow {
    pub first_name: String,
    pub last_name: String,
}

/// Credentials lookup row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: i64,
    pub password_hash: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = identities)]
pub(crate) struct NewIdentityRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: i64,
    pub identity_id: i64,
    pub date_of_birth: NaiveDate,
    pub blood_type: String,
    pub phone: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patients)]
pub(crate) struct NewPatientRow<'a> {
    pub identity_id: i64,
    pub date_of_birth: NaiveDate,
    pub blood_type: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DoctorRow {
    pub id: i64,
    pub identity_id: i64,
    pub specialization: String,
    pub phone: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = doctors)]
pub(crate) struct NewDoctorRow<'a> {
    pub identity_id: i64,
    pub specialization: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDateTime,
    pub reason: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub(crate) struct NewAppointmentRow<'a> {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDateTime,
    pub reason: &'a str,
}

/// Changeset applied when a patient edits a booking.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = appointments)]
pub(crate) struct AppointmentChangeset<'a> {
    pub doctor_id: i64,
    pub appointment_date: NaiveDateTime,
    pub reason: &'a str,
}

fn invalid(what: &str, id: i64, err: impl std::fmt::Display) -> String {
    format!("stored {what} {id} is invalid: {err}")
}

impl TryFrom<IdentityRow> for Identity {
    type Error = String;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: IdentityId::new(id),
            username: Username::new(&row.username)
                .map_err(|e| invalid("identity", id, e))?,
            email: EmailAddress::new(&row.email).map_err(|e| invalid("identity", id, e))?,
            first_name: PersonName::new(&row.first_name)
                .map_err(|e| invalid("identity", id, e))?,
            last_name: PersonName::new(&row.last_name)
                .map_err(|e| invalid("identity", id, e))?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<(PatientRow, IdentityNamesRow)> for Patient {
    type Error = String;

    fn try_from((row, names): (PatientRow, IdentityNamesRow)) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: PatientId::new(id),
            identity_id: IdentityId::new(row.identity_id),
            first_name: PersonName::new(&names.first_name)
                .map_err(|e| invalid("patient", id, e))?,
            last_name: PersonName::new(&names.last_name)
                .map_err(|e| invalid("patient", id, e))?,
            date_of_birth: row.date_of_birth,
            blood_type: row
                .blood_type
                .parse::<BloodType>()
                .map_err(|e| invalid("patient", id, e))?,
            phone: PhoneNumber::new(&row.phone).map_err(|e| invalid("patient", id, e))?,
        })
    }
}

impl TryFrom<(DoctorRow, IdentityNamesRow)> for Doctor {
    type Error = String;

    fn try_from((row, names): (DoctorRow, IdentityNamesRow)) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: DoctorId::new(id),
            identity_id: IdentityId::new(row.identity_id),
            first_name: PersonName::new(&names.first_name)
                .map_err(|e| invalid("doctor", id, e))?,
            last_name: PersonName::new(&names.last_name)
                .map_err(|e| invalid("doctor", id, e))?,
            specialization: row
                .specialization
                .parse::<Specialization>()
                .map_err(|e| invalid("doctor", id, e))?,
            phone: PhoneNumber::new(&row.phone).map_err(|e| invalid("doctor", id, e))?,
        })
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = String;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: AppointmentId::new(id),
            patient_id: PatientId::new(row.patient_id),
            doctor_id: DoctorId::new(row.doctor_id),
            appointment_date: row.appointment_date,
            reason: AppointmentReason::new(&row.reason)
                .map_err(|e| invalid("appointment", id, e))?,
        })
    }
}
