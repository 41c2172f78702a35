//! HTTP router.
//!
//! Returns a composable `Router` with every JSON route under `/api/`,
//! plus `app()` which adds CORS and the static landing-page assets.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Access logger → handler

use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the JSON API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/session", get(endpoints::auth::session))
        .route("/users/:id", get(endpoints::users::by_id))
        .route("/clinicians/search", get(endpoints::users::search_clinicians))
        .route("/patient/dashboard", get(endpoints::patient::dashboard))
        .route("/patient/doctor", get(endpoints::patient::doctor))
        .route("/patient/doctor/search", get(endpoints::patient::search))
        .route(
            "/patient/doctor/request",
            post(endpoints::patient::request_link),
        )
        .route("/clinician/dashboard", get(endpoints::clinician::dashboard))
        .route("/clinician/requests", get(endpoints::clinician::requests))
        .route(
            "/clinician/requests/:id/accept",
            post(endpoints::clinician::accept),
        )
        .route(
            "/clinician/requests/:id/reject",
            post(endpoints::clinician::reject),
        )
        .route("/clinician/patients", get(endpoints::clinician::patients))
        .route(
            "/clinician/patients/:id/record",
            get(endpoints::clinician::get_record).put(endpoints::clinician::save_record),
        )
        .route(
            "/clinician/patients/:id/simulation",
            get(endpoints::clinician::simulate),
        )
        .route("/simulation", post(endpoints::simulation::run))
        .route("/chat", post(endpoints::chat::send))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", routes)
}

/// Full application: API routes, CORS, and static assets when
/// `static_dir` is given.
pub fn app(ctx: ApiContext, static_dir: Option<&Path>) -> Router {
    let router = api_router(ctx);
    let router = match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static assets");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };
    router.layer(CorsLayer::permissive())
}
