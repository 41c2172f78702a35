//! Patient pages.
//!
//! - `GET /api/patient/dashboard` — dashboard view model
//! - `GET /api/patient/doctor` — doctor status line
//! - `GET /api/patient/doctor/search?q=` — clinicians to ask
//! - `POST /api/patient/doctor/request` — ask a clinician to link
//!
//! Every handler requires a patient session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::endpoints::users::SearchQuery;
use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::types::ApiContext;
use crate::authorization;
use crate::dashboard::{self, DoctorSearch, DoctorStatus, PatientDashboard, REQUEST_SENT_MESSAGE};
use crate::models::{LinkRequest, Role};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequestBody {
    pub clinician_id: String,
}

#[derive(Serialize)]
pub struct LinkRequestResponse {
    pub request: LinkRequest,
    pub message: &'static str,
}

pub async fn dashboard(State(ctx): State<ApiContext>) -> Result<Json<PatientDashboard>, ApiError> {
    Ok(Json(dashboard::patient_dashboard(&ctx.repo)?))
}

pub async fn doctor(State(ctx): State<ApiContext>) -> Result<Json<DoctorStatus>, ApiError> {
    let user = authorization::require_role(&ctx.repo, Role::Patient)?;
    Ok(Json(dashboard::doctor_status(&ctx.repo, &user.id)?))
}

pub async fn search(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<DoctorSearch>, ApiError> {
    Ok(Json(dashboard::search_doctors(&ctx.repo, &query.q)?))
}

pub async fn request_link(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<LinkRequestBody>,
) -> Result<(StatusCode, Json<LinkRequestResponse>), ApiError> {
    let user = authorization::require_role(&ctx.repo, Role::Patient)?;
    if body.clinician_id.trim().is_empty() {
        return Err(ApiError::BadRequest("clinicianId is required".into()));
    }

    let request = authorization::request_link(&ctx.repo, &user.id, &body.clinician_id)?;
    Ok((
        StatusCode::CREATED,
        Json(LinkRequestResponse {
            request,
            message: REQUEST_SENT_MESSAGE,
        }),
    ))
}
