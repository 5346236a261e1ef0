//! Gestion des routes accessibles sans authentification.
//! Contient les handlers pour la connexion, l'inscription et la sonde de santé.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, header::USER_AGENT, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use cookie::Cookie;
use serde_json::json;

use crate::backend::{
    models::{LoginRequest, RegisterRequest},
    AppState,
};
use crate::consts::{BROWSER_AGENTS, TOKEN_COOKIE_NAME, TOKEN_LIFETIME_HOURS};
use crate::utils::error_messages::{AppError, INVALID_BODY};

/// Détecte un navigateur (ou Postman) d'après son User-Agent
pub fn is_browser(user_agent: &str) -> bool {
    BROWSER_AGENTS.iter().any(|agent| user_agent.contains(agent))
}

/// En-têtes de réponse : le token est aussi posé en cookie HTTP-only
/// pour les navigateurs
fn token_cookie_headers(request_headers: &HeaderMap, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let user_agent = request_headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !is_browser(user_agent) {
        return headers;
    }

    let mut cookie = Cookie::new(TOKEN_COOKIE_NAME, token.to_string());
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(cookie::time::Duration::hours(TOKEN_LIFETIME_HOURS));

    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.insert(SET_COOKIE, value);
    }
    headers
}

/// Connexion par nom d'utilisateur et mot de passe
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|_| AppError::bad_request(INVALID_BODY))?;

    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::bad_request("Username and password are required"));
    }

    let session = state.auth.login(&request.username, &request.password)?;
    let cookie = token_cookie_headers(&headers, &session.token);

    Ok((cookie, Json(session)))
}

/// Inscription d'un médecin ou d'un réceptionniste
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|_| AppError::bad_request(INVALID_BODY))?;

    let session = state
        .auth
        .register(&request.username, &request.password, &request.role)?;
    let cookie = token_cookie_headers(&headers, &session.token);

    Ok((StatusCode::CREATED, cookie, Json(session)))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
