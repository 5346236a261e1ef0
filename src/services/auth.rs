//! Connexion et inscription.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::authorization::AuthError;
use crate::db::{DBError, UserStore};
use crate::models::{NewUser, UserData, UserView};
use crate::utils::input_validation::{credentials_validation, parse_role};
use crate::utils::jwt::TokenService;
use crate::utils::password_utils::{hash, verify};

/// Un token fraîchement émis et l'utilisateur auquel il appartient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserView,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Vérifie le mot de passe et émet un token.
    ///
    /// Utilisateur inconnu et mauvais mot de passe donnent exactement
    /// la même erreur.
    pub fn login(&self, username: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let user = match self.users.find_by_username(username) {
            Ok(user) => Some(user),
            Err(DBError::UserNotFound) => None,
            Err(other) => return Err(other.into()),
        };

        if !verify(password, user.as_ref().map(|u| &u.password)) {
            debug!("Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }

        let user = user.ok_or(AuthError::InvalidCredentials)?;
        info!("User {} logged in", user.id);
        self.session_for(&user)
    }

    /// Crée un compte puis émet un token pour celui-ci
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<AuthSession, ServiceError> {
        let user = self.create_account(username, password, role)?;
        self.session_for(&user)
    }

    /// Crée un compte sans émettre de token
    pub fn create_account(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<UserData, ServiceError> {
        let role = parse_role(role).ok_or(ServiceError::InvalidRole)?;
        credentials_validation(username, password)
            .map_err(|msg| ServiceError::InvalidInput(msg.to_string()))?;

        // Fast path for a friendlier error; the store enforces it again on insert
        match self.users.find_by_username(username) {
            Ok(_) => return Err(ServiceError::UsernameTaken),
            Err(DBError::UserNotFound) => {}
            Err(other) => return Err(other.into()),
        }

        let user = self.users.create(NewUser {
            username: username.to_string(),
            password: hash(password)?,
            role,
        })?;

        info!("Account {} created with role {}", user.id, user.role);
        Ok(user)
    }

    fn session_for(&self, user: &UserData) -> Result<AuthSession, ServiceError> {
        Ok(AuthSession {
            token: self.tokens.issue(user.id, user.role)?,
            user: UserView::from(user),
        })
    }
}
