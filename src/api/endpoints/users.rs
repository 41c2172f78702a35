//! Directory lookups.
//!
//! - `GET /api/users/:id` — one account, without its password
//! - `GET /api/clinicians/search?q=` — clinicians by name or email

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::extract::ApiQuery;
use crate::api::types::ApiContext;
use crate::authorization;
use crate::models::PublicUser;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn by_id(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = authorization::user_by_id(&ctx.repo, &id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(PublicUser::from(&user)))
}

pub async fn search_clinicians(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let found = authorization::search_clinicians(&ctx.repo, &query.q)?;
    Ok(Json(found.iter().map(PublicUser::from).collect()))
}
