//! Represents all possible errors returned to HTTP clients

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;

use crate::authorization::AuthError;
use crate::services::{ErrorKind, ServiceError};

pub const INVALID_BODY: &str = "Invalid request body";

pub const INVALID_SEARCH: &str = "Invalid search parameters";

pub const INVALID_PATIENT_ID: &str = "Invalid patient ID";

pub const INVALID_USER_ID: &str = "Invalid user ID";

pub const INTERNAL_ERROR: &str = "internal server error";

/// Erreur renvoyée par un handler, sérialisée en `{"error": "..."}`
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        Self::Service(ServiceError::Auth(e))
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        let Self::Service(e) = self else {
            return StatusCode::BAD_REQUEST;
        };

        match (e.kind(), e) {
            (ErrorKind::Auth, ServiceError::Auth(AuthError::Forbidden)) => StatusCode::FORBIDDEN,
            (ErrorKind::Auth, _) => StatusCode::UNAUTHORIZED,
            (ErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
            (ErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
            (ErrorKind::Conflict, _) => StatusCode::CONFLICT,
            (ErrorKind::Internal, _) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Service(e) if e.kind() == ErrorKind::Internal => {
                error!("Request failed: {e}");
                INTERNAL_ERROR.to_string()
            }
            Self::Service(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
