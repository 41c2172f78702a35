//! Access logging middleware.
//!
//! Logs every API request with a request id, method, path, the role of
//! the session user at the time of the request, and the response status.

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::ApiContext;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Log API access. Accesses `ApiContext` from request extensions.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = uuid::Uuid::new_v4().to_string();

    let role = req
        .extensions()
        .get::<ApiContext>()
        .and_then(|ctx| ctx.repo.load_current_user().ok().flatten())
        .map(|user| user.role.as_str())
        .unwrap_or("anonymous");

    let mut response = next.run(req).await;

    tracing::info!(
        request_id = %request_id,
        %method,
        %path,
        role,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API request"
    );

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    response
}
