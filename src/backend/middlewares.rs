//! Middlewares d'authentification et de contrôle des rôles.
//!
//! `authenticate` doit envelopper toutes les routes protégées : c'est lui qui
//! place l'[`AuthenticatedUser`] dans la requête. Les gardes de rôle le lisent
//! ensuite et répondent 401 s'il est absent.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::authorization::{AuthError, AuthenticatedUser};
use crate::backend::AppState;
use crate::models::Role;
use crate::utils::error_messages::AppError;

/// Vérifie le bearer token et mémorise l'utilisateur pour la suite de la requête
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state.guard.authenticate(request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn receptionist_only(
    user: AuthenticatedUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    user.require_role(Role::Receptionist)?;
    Ok(next.run(request).await)
}

pub async fn doctor_only(
    user: AuthenticatedUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    user.require_role(Role::Doctor)?;
    Ok(next.run(request).await)
}

/// Extraction de l'utilisateur placé par `authenticate`
#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::Unauthenticated.into())
    }
}
