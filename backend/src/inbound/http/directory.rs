//! Patient and doctor directory handlers.
//!
//! ```text
//! GET /patients/?q=smith
//! GET /doctors/?q=cardio
//! ```

use actix_web::{get, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DirectorySearch, Doctor, Error, Patient};

use super::ApiResult;
use super::state::HttpState;

/// Directory search parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring; blank lists everything.
    pub q: Option<String>,
}

/// Patient row in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    /// Patient profile id, as used by `/appointments/`.
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// First and last name joined.
    #[schema(example = "Alice Smith")]
    pub display_name: String,
    #[schema(value_type = String, format = Date, example = "1990-01-01")]
    pub date_of_birth: NaiveDate,
    /// ABO group with Rh sign.
    #[schema(example = "O+")]
    pub blood_type: String,
    pub phone: String,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.get(),
            display_name: patient.display_name(),
            first_name: patient.first_name.to_string(),
            last_name: patient.last_name.to_string(),
            date_of_birth: patient.date_of_birth,
            blood_type: patient.blood_type.as_str().to_owned(),
            phone: patient.phone.to_string(),
        }
    }
}

/// Doctor row in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "Dr. Gregory House")]
    pub display_name: String,
    #[schema(example = "Cardiology")]
    pub specialization: String,
    pub phone: String,
}

impl From<Doctor> for DoctorResponse {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id.get(),
            display_name: doctor.display_name(),
            first_name: doctor.first_name.to_string(),
            last_name: doctor.last_name.to_string(),
            specialization: doctor.specialization.as_str().to_owned(),
            phone: doctor.phone.to_string(),
        }
    }
}

/// Payload of `GET /patients/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientListResponse {
    /// Effective search term after trimming.
    pub query: Option<String>,
    pub patients: Vec<PatientResponse>,
}

/// Payload of `GET /doctors/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorListResponse {
    pub query: Option<String>,
    pub doctors: Vec<DoctorResponse>,
}

/// List patients, optionally filtered by name or blood type.
#[utoipa::path(
    get,
    path = "/patients/",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching patients in id order", body = PatientListResponse),
        (status = 503, description = "Directory unavailable", body = Error)
    ),
    tags = ["directory"],
    operation_id = "listPatients",
    security([])
)]
#[get("/patients/")]
pub async fn list_patients(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<PatientListResponse>> {
    let search = DirectorySearch::new(query.q.as_deref());
    let patients = state.directory.patients(&search).await?;
    Ok(web::Json(PatientListResponse {
        query: search.term().map(str::to_owned),
        patients: patients.into_iter().map(PatientResponse::from).collect(),
    }))
}

/// List doctors, optionally filtered by name or specialization.
#[utoipa::path(
    get,
    path = "/doctors/",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching doctors in id order", body = DoctorListResponse),
        (status = 503, description = "Directory unavailable", body = Error)
    ),
    tags = ["directory"],
    operation_id = "listDoctors",
    security([])
)]
#[get("/doctors/")]
pub async fn list_doctors(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<DoctorListResponse>> {
    let search = DirectorySearch::new(query.q.as_deref());
    let doctors = state.directory.doctors(&search).await?;
    Ok(web::Json(DoctorListResponse {
        query: search.term().map(str::to_owned),
        doctors: doctors.into_iter().map(DoctorResponse::from).collect(),
    }))
}
