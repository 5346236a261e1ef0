//! Configuration du service, lue une seule fois au démarrage.
//!
//! Les valeurs viennent de l'environnement (éventuellement d'un fichier `.env`)
//! et sont ensuite injectées explicitement dans les services.

use std::{env, path::PathBuf};

use log::warn;

use crate::consts::{DB_PATH, DEFAULT_JWT_SECRET, HTTP_PORT};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    pub jwt_secret: String,
    /// `None` : base purement en mémoire
    pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: HTTP_PORT,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            db_path: Some(PathBuf::from(DB_PATH)),
        }
    }
}

impl AppConfig {
    /// Charge `.env` s'il existe, puis lit les variables d'environnement.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture arbitraire.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let http_port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid PORT value {raw:?}, falling back to {HTTP_PORT}");
                HTTP_PORT
            }),
            None => defaults.http_port,
        };

        let jwt_secret = match lookup("JWT_SECRET_KEY") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET_KEY not set, using the built-in default secret");
                defaults.jwt_secret
            }
        };

        let db_path = match lookup("DB_PATH") {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => defaults.db_path,
        };

        Self {
            http_port,
            jwt_secret,
            db_path,
        }
    }
}
