//! Configuration des routes pour l'application.
//! Définit les routes accessibles avec ou sans authentification et configure les middlewares.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::backend::handlers_auth::{
    create_patient, create_user, current_user, delete_patient, get_patient, get_user,
    list_patients, list_users, search_patients, update_medical_notes, update_patient,
};
use crate::backend::handlers_unauth::{health, login, register};
use crate::backend::middlewares::{authenticate, doctor_only, receptionist_only};
use crate::backend::AppState;

/// Initialisation du routeur principal et des middlewares
pub fn get_router(state: AppState) -> Router {
    // Authentication wraps every protected route, so it runs before any role gate
    let protected = user_routes()
        .merge(patient_routes())
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let router = Router::new()
        .merge(unauth_routes())
        .merge(protected);

    // Configuration CORS pour permettre les requêtes de n'importe quelle origine (en mode debug uniquement)
    let router = if cfg!(debug_assertions) {
        let cors = CorsLayer::new()
            .allow_methods(tower_http::cors::AllowMethods::any())
            .allow_headers(Any)
            .allow_origin(Any);
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}

/// Routes accessibles sans authentification
fn unauth_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
}

/// Comptes utilisateurs, tout rôle authentifié
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/me", get(current_user))
        .route("/api/users/:id", get(get_user))
}

/// Dossiers patients, avec un sous-ensemble de routes par rôle
fn patient_routes() -> Router<AppState> {
    let shared = Router::new()
        .route("/api/patients", get(list_patients))
        .route("/api/patients/:id", get(get_patient));

    let receptionist = Router::new()
        .route("/api/patients", post(create_patient))
        .route("/api/patients/search", get(search_patients))
        .route(
            "/api/patients/:id",
            put(update_patient).delete(delete_patient),
        )
        .route_layer(from_fn(receptionist_only));

    let doctor = Router::new()
        .route("/api/patients/:id/medical-notes", put(update_medical_notes))
        .route_layer(from_fn(doctor_only));

    shared.merge(receptionist).merge(doctor)
}
