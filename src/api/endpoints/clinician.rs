//! Clinician pages.
//!
//! - `GET /api/clinician/dashboard` — pending requests and patients
//! - `GET /api/clinician/requests` — pending requests only
//! - `POST /api/clinician/requests/:id/accept` and `/reject`
//! - `GET /api/clinician/patients` — accepted patients
//! - `GET|PUT /api/clinician/patients/:id/record` — clinical record form
//! - `GET /api/clinician/patients/:id/simulation` — simulation seeded
//!   from the stored record
//!
//! Every handler requires a clinician session. Ownership of the request
//! or patient is not checked.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::types::ApiContext;
use crate::authorization;
use crate::dashboard::{self, ClinicianDashboard, PendingRequest};
use crate::models::{LinkStatus, PatientClinicalRecord, PatientSummary, PublicUser, Role};
use crate::patient_data;
use crate::simulation::{self, SimulationForm, SimulationResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecision {
    pub id: String,
    pub status: LinkStatus,
}

fn require_clinician(ctx: &ApiContext) -> Result<PublicUser, ApiError> {
    Ok(authorization::require_role(&ctx.repo, Role::Clinician)?)
}

pub async fn dashboard(
    State(ctx): State<ApiContext>,
) -> Result<Json<ClinicianDashboard>, ApiError> {
    Ok(Json(dashboard::clinician_dashboard(&ctx.repo)?))
}

pub async fn requests(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<PendingRequest>>, ApiError> {
    let user = require_clinician(&ctx)?;
    Ok(Json(dashboard::pending_requests(&ctx.repo, &user.id)?))
}

pub async fn accept(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<RequestDecision>, ApiError> {
    require_clinician(&ctx)?;
    decide(authorization::accept_request(&ctx.repo, &id)?, id, LinkStatus::Accepted)
}

pub async fn reject(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<RequestDecision>, ApiError> {
    require_clinician(&ctx)?;
    decide(authorization::reject_request(&ctx.repo, &id)?, id, LinkStatus::Rejected)
}

fn decide(found: bool, id: String, status: LinkStatus) -> Result<Json<RequestDecision>, ApiError> {
    if !found {
        return Err(ApiError::NotFound(format!("Request {id} not found")));
    }
    Ok(Json(RequestDecision { id, status }))
}

pub async fn patients(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let user = require_clinician(&ctx)?;
    Ok(Json(authorization::my_patients(&ctx.repo, &user.id)?))
}

pub async fn get_record(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<PatientClinicalRecord>, ApiError> {
    require_clinician(&ctx)?;
    Ok(Json(patient_data::prefill(&ctx.repo, &id)?))
}

pub async fn save_record(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(record): ApiJson<PatientClinicalRecord>,
) -> Result<Json<PatientClinicalRecord>, ApiError> {
    require_clinician(&ctx)?;
    Ok(Json(patient_data::save_record(&ctx.repo, &id, record)?))
}

/// Run the simulation over the patient's stored measurements.
pub async fn simulate(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<SimulationResult>, ApiError> {
    require_clinician(&ctx)?;
    let record = patient_data::get_record(&ctx.repo, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("No record for patient {id}")))?;
    let inputs = SimulationForm::from(&record).resolve();
    Ok(Json(simulation::run(inputs)?))
}
