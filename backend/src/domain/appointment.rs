//! Appointment records and scheduling values.
//!
//! A booking form supplies the date and the time separately; both are merged
//! into one naive local timestamp before anything is stored.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{DoctorId, PatientId};

/// Message reported on `appointment_time` when only a date was supplied.
pub const MISSING_TIME_MESSAGE: &str = "Please select a time for the appointment.";
/// Message reported on `appointment_date` when only a time was supplied.
pub const MISSING_DATE_MESSAGE: &str = "Please select a date for the appointment.";

/// Primary key of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(i64);

impl AppointmentId {
    /// Wrap a raw database key.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database key.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text reason for the visit. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentReason(String);

/// Error returned for a blank reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("reason must not be empty")]
pub struct EmptyReason;

impl AppointmentReason {
    /// Validate and construct a reason, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyReason> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyReason);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AppointmentReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AppointmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which half of the schedule is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time arrived without a date.
    MissingDate,
    /// A date arrived without a time.
    MissingTime,
    /// Neither half was supplied.
    MissingBoth,
}

/// Merge a date and a time into one timestamp.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use clinic::domain::{ScheduleError, merge_schedule};
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 1);
/// let time = NaiveTime::from_hms_opt(9, 0, 0);
/// let at = merge_schedule(date, time).unwrap();
/// assert_eq!(at.to_string(), "2025-06-01 09:00:00");
/// assert_eq!(merge_schedule(date, None), Err(ScheduleError::MissingTime));
/// ```
pub fn merge_schedule(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
) -> Result<NaiveDateTime, ScheduleError> {
    match (date, time) {
        (Some(date), Some(time)) => Ok(date.and_time(time)),
        (Some(_), None) => Err(ScheduleError::MissingTime),
        (None, Some(_)) => Err(ScheduleError::MissingDate),
        (None, None) => Err(ScheduleError::MissingBoth),
    }
}

/// Stored appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: AppointmentId,
    /// Patient who booked; the only one allowed to edit or cancel.
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    /// Naive local date and time of the visit.
    pub appointment_date: NaiveDateTime,
    pub reason: AppointmentReason,
}

impl Appointment {
    /// Whether `patient` owns this appointment.
    pub fn is_owned_by(&self, patient: Option<PatientId>) -> bool {
        patient == Some(self.patient_id)
    }
}

/// Validated booking values shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    /// Doctor the visit is with; must exist when the draft is stored.
    pub doctor_id: DoctorId,
    /// Merged date and time from the form.
    pub appointment_date: NaiveDateTime,
    pub reason: AppointmentReason,
}

/// Appointment ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub appointment_date: NaiveDateTime,
    pub reason: AppointmentReason,
}

impl NewAppointment {
    /// Bind a draft to the booking patient.
    pub fn for_patient(patient_id: PatientId, draft: AppointmentDraft) -> Self {
        Self {
            patient_id,
            doctor_id: draft.doctor_id,
            appointment_date: draft.appointment_date,
            reason: draft.reason,
        }
    }
}

/// Rows visible to a caller in the appointment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    All,
    Patient(PatientId),
    Doctor(DoctorId),
}

impl AppointmentScope {
    /// Whether `appointment` falls inside the scope.
    pub fn includes(&self, appointment: &Appointment) -> bool {
        match self {
            Self::All => true,
            Self::Patient(id) => appointment.patient_id == *id,
            Self::Doctor(id) => appointment.doctor_id == *id,
        }
    }
}

/// Appointment enriched with display names for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentSummary {
    pub appointment: Appointment,
    pub patient_name: String,
    pub doctor_name: String,
}
