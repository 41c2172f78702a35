//! Request extractors whose rejections go through `ApiError`, so a
//! malformed body or query string gets the same JSON error shape as
//! every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::api::error::ApiError;

/// `axum::Json` with an `ApiError` rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with an `ApiError` rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
