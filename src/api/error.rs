//! API error types with structured JSON responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::authorization::AuthorizationError;
use crate::models::Role;
use crate::patient_data::PatientDataError;
use crate::simulation::SimulationError;

/// Page a role-guard failure sends the browser back to.
pub const LOGIN_PAGE: &str = "login.html";

/// Plain-text body returned when the LLM provider fails.
pub const CHAT_FAILURE_BODY: &str = "Error connecting to AI";

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Login required as {0}")]
    LoginRequired(Role),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Conflict: {1}")]
    Conflict(&'static str, String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Chat provider failed: {0}")]
    ChatUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, redirect) = match &self {
            ApiError::LoginRequired(role) => (
                StatusCode::FORBIDDEN,
                "LOGIN_REQUIRED",
                AuthorizationError::LoginRequired(*role).to_string(),
                Some(LOGIN_PAGE),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                AuthorizationError::InvalidCredentials.to_string(),
                None,
            ),
            ApiError::Conflict(code, detail) => {
                (StatusCode::CONFLICT, *code, detail.clone(), None)
            }
            ApiError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone(), None)
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone(), None)
            }
            ApiError::ChatUnavailable(detail) => {
                tracing::error!(detail, "Error connecting to chat provider");
                return (StatusCode::INTERNAL_SERVER_ERROR, CHAT_FAILURE_BODY).into_response();
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                redirect,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::LoginRequired(role) => ApiError::LoginRequired(role),
            AuthorizationError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthorizationError::EmailTaken => ApiError::Conflict("EMAIL_TAKEN", err.to_string()),
            AuthorizationError::LinkExists => ApiError::Conflict("LINK_EXISTS", err.to_string()),
            AuthorizationError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PatientDataError> for ApiError {
    fn from(err: PatientDataError) -> Self {
        match err {
            PatientDataError::NoPatientSelected => ApiError::BadRequest(err.to_string()),
            PatientDataError::Authorization(e) => e.into(),
            PatientDataError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<crate::db::DatabaseError> for ApiError {
    fn from(err: crate::db::DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn json_body(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn login_required_returns_403_with_redirect() {
        let response = ApiError::LoginRequired(Role::Clinician).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "LOGIN_REQUIRED");
        assert_eq!(json["error"]["redirect"], "login.html");
    }

    #[tokio::test]
    async fn invalid_credentials_returns_401() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Invalid email or password.");
        assert!(json["error"].get("redirect").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_conflict() {
        let response = ApiError::from(AuthorizationError::EmailTaken).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn simulation_error_maps_to_bad_request() {
        let response = ApiError::from(SimulationError::InvalidHeight).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Please enter a valid height (100–250 cm).");
    }

    #[tokio::test]
    async fn chat_failure_is_plain_text_500() {
        let response = ApiError::ChatUnavailable("timeout".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], CHAT_FAILURE_BODY.as_bytes());
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("disk full".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
