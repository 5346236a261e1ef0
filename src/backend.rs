//! Module principal pour le backend de l'application.
//! Contient les gestionnaires pour les routes, les modèles de données,
//! le routeur, et les middlewares.
pub mod handlers_auth;
pub mod handlers_unauth;
pub mod middlewares;
pub mod models;
pub mod router;

use std::sync::Arc;

use crate::authorization::AccessGuard;
use crate::config::AppConfig;
use crate::db::{DBError, Database};
use crate::services::{AuthService, PatientService, UserService};
use crate::utils::clock::SystemClock;
use crate::utils::jwt::TokenService;

/// État partagé par tous les handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub patients: Arc<PatientService>,
    pub guard: AccessGuard,
}

impl AppState {
    pub fn new(db: Arc<Database>, tokens: Arc<TokenService>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(db.clone(), tokens.clone())),
            users: Arc::new(UserService::new(db.clone())),
            patients: Arc::new(PatientService::new(db.clone())),
            guard: AccessGuard::new(tokens, db),
        }
    }

    /// Ouvre la base et construit les services à partir de la configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, DBError> {
        let db = match &config.db_path {
            Some(path) => Database::open(path.clone())?,
            None => Database::in_memory(),
        };
        let tokens = TokenService::new(&config.jwt_secret, Arc::new(SystemClock));
        Ok(Self::new(Arc::new(db), Arc::new(tokens)))
    }
}
