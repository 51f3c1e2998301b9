//! Landing page handler.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Caller, Role};

use super::ApiResult;
use super::auth::CallerResponse;
use super::navigation::{APPOINTMENTS_PATH, LOGIN_PATH, current_caller};
use super::session::SessionContext;
use super::state::HttpState;

/// A link the landing page offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Action {
    #[schema(example = "Book an appointment")]
    pub label: String,
    #[schema(example = "GET")]
    pub method: String,
    #[schema(example = "/appointments/add/")]
    pub path: String,
}

impl Action {
    fn get(label: &str, path: &str) -> Self {
        Self {
            label: label.to_owned(),
            method: "GET".to_owned(),
            path: path.to_owned(),
        }
    }

    fn post(label: &str, path: &str) -> Self {
        Self {
            method: "POST".to_owned(),
            ..Self::get(label, path)
        }
    }
}

/// Payload of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeResponse {
    /// Signed-in caller, absent for anonymous visitors.
    pub caller: Option<CallerResponse>,
    pub actions: Vec<Action>,
}

fn actions_for(caller: Option<&Caller>) -> Vec<Action> {
    let Some(caller) = caller else {
        return vec![
            Action::get("Log in", LOGIN_PATH),
            Action::get("Register as a patient", "/register/patient/"),
            Action::get("Register as a doctor", "/register/doctor/"),
            Action::get("Patients", "/patients/"),
            Action::get("Doctors", "/doctors/"),
        ];
    };

    let mut actions = vec![Action::get("Appointments", APPOINTMENTS_PATH)];
    if matches!(caller.role, Role::Patient(_)) {
        actions.push(Action::get("Book an appointment", "/appointments/add/"));
    }
    actions.push(Action::get("Patients", "/patients/"));
    actions.push(Action::get("Doctors", "/doctors/"));
    actions.push(Action::post("Log out", "/logout/"));
    actions
}

/// Landing payload naming the caller and what they can do next.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing payload", body = HomeResponse)),
    tags = ["pages"],
    operation_id = "home",
    security([])
)]
#[get("/")]
pub async fn home(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<HomeResponse>> {
    let caller = current_caller(&state, &session).await?;
    Ok(web::Json(HomeResponse {
        actions: actions_for(caller.as_ref()),
        caller: caller.as_ref().map(CallerResponse::from),
    }))
}
