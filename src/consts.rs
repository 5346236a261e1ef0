//! Définition des constantes globales pour l'application.

pub const HTTP_PORT: u16 = 8080; // Port par défaut pour le serveur HTTP.
pub const DB_PATH: &str = "./data/hospital.yaml"; // Chemin par défaut de la sauvegarde YAML.

/// Clé de signature utilisée si `JWT_SECRET_KEY` n'est pas définie.
/// Faible par nature : à remplacer en production.
pub const DEFAULT_JWT_SECRET: &str = "default_jwt_secret_key";

pub const TOKEN_LIFETIME_HOURS: i64 = 24; // Durée de validité d'un token.
pub const TOKEN_COOKIE_NAME: &str = "jwt_token";

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const MIN_AGE: i32 = 0;
pub const MAX_AGE: i32 = 150;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Longueur maximale des champs courts (nom, contact)
pub const MAX_SHORT_CONTENT_LENGTH: u64 = 250;
/// Longueur maximale des notes médicales
pub const MAX_CONTENT_LENGTH: u64 = 2_000;

/// Fragments de User-Agent identifiant un navigateur (ou Postman)
pub const BROWSER_AGENTS: [&str; 6] = [
    "PostmanRuntime",
    "Mozilla",
    "Chrome",
    "Safari",
    "Firefox",
    "Edge",
];
