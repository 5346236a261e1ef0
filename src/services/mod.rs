//! API métier, appelée par les handlers HTTP.
//!
use log::error;
use thiserror::Error;

use crate::authorization::AuthError;
use crate::db::DBError;
use crate::utils::jwt::TokenError;
use crate::utils::password_utils::HashError;

pub mod auth;
pub mod patients;
pub mod users;

pub use auth::{AuthService, AuthSession};
pub use patients::PatientService;
pub use users::UserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Role must be either doctor or receptionist")]
    InvalidRole,

    #[error("{0}")]
    NotFound(String),

    #[error("username already exists")]
    UsernameTaken,

    #[error("patient with this name or contact info already exists")]
    DuplicatePatient,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Grandes familles d'erreurs, indépendantes du transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Auth,
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) | Self::InvalidRole => {
                ErrorKind::Validation
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UsernameTaken | Self::DuplicatePatient => ErrorKind::Conflict,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }
}

impl From<DBError> for ServiceError {
    fn from(e: DBError) -> Self {
        match e {
            DBError::UserNotFound | DBError::PatientNotFound => Self::NotFound(e.to_string()),
            DBError::UserAlreadyExists { .. } => Self::UsernameTaken,
            DBError::DuplicatePatient => Self::DuplicatePatient,
            other => {
                error!("Storage failure: {other}");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<HashError> for ServiceError {
    fn from(e: HashError) -> Self {
        error!("{e}");
        Self::Internal(e.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(e: TokenError) -> Self {
        error!("Token issuance failed: {e}");
        Self::Internal(e.to_string())
    }
}
