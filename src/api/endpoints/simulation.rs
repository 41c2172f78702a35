//! `POST /api/simulation` — risk calculator.
//!
//! Open to any caller; missing fields take their defaults.

use axum::Json;

use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::simulation::{self, SimulationForm, SimulationResult};

pub async fn run(
    ApiJson(form): ApiJson<SimulationForm>,
) -> Result<Json<SimulationResult>, ApiError> {
    Ok(Json(simulation::run(form.resolve())?))
}
