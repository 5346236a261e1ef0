//! Contrôle d'accès : authentification par bearer token puis vérification du rôle.
//!
//! Un [`AuthenticatedUser`] ne peut être obtenu que par
//! [`AccessGuard::authenticate`] ; les vérifications de rôle étant des
//! méthodes de ce type, il est impossible de tester un rôle sur une
//! requête non authentifiée.

use std::sync::Arc;

use http::{header::AUTHORIZATION, HeaderMap};
use log::{debug, warn};
use thiserror::Error;

use crate::db::UserStore;
use crate::models::{Role, UserData, UserID};
use crate::utils::jwt::TokenService;

const BEARER_PREFIX: &str = "Bearer ";

/// Erreurs d'authentification, volontairement peu détaillées
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("authorization header is required")]
    MissingHeader,

    #[error("invalid authorization header format")]
    MalformedHeader,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,
}

/// L'utilisateur courant, rechargé depuis la base pour cette requête
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(UserData);

impl AuthenticatedUser {
    pub fn user(&self) -> &UserData {
        &self.0
    }

    pub fn id(&self) -> UserID {
        self.0.id
    }

    /// Rôle actuel en base, pas celui inscrit dans le token
    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        self.require_any_role(&[required])
    }

    pub fn require_any_role(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            debug!(
                "Access denied for user {} with role {}",
                self.0.id, self.0.role
            );
            Err(AuthError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Authentifie une requête à partir de son en-tête `Authorization`
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let header = match headers.get(AUTHORIZATION) {
            None => return Err(AuthError::MissingHeader),
            Some(value) if value.is_empty() => return Err(AuthError::MissingHeader),
            Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader)?,
        };

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::MalformedHeader)?;

        let claims = self.tokens.validate(token).map_err(|e| {
            debug!("Rejected token: {e}");
            AuthError::InvalidToken
        })?;

        let user = self.users.find_by_id(claims.user_id).map_err(|e| {
            debug!("Token subject {} could not be resolved: {e}", claims.user_id);
            AuthError::InvalidToken
        })?;

        if user.role != claims.role {
            warn!(
                "Token for user {} carries stale role {}, current role is {}",
                user.id, claims.role, user.role
            );
        }

        Ok(AuthenticatedUser(user))
    }
}
