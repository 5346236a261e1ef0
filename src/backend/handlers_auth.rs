//! Gestion des routes nécessitant une authentification utilisateur.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::authorization::AuthenticatedUser;
use crate::backend::{
    models::{MedicalNotesRequest, PageQuery, PatientPageResponse, RegisterRequest},
    AppState,
};
use crate::models::{PatientID, PatientInput, PatientSearch, PatientView, UserID, UserView};
use crate::services::ServiceError;
use crate::utils::error_messages::{
    AppError, INVALID_BODY, INVALID_PATIENT_ID, INVALID_SEARCH, INVALID_USER_ID,
};

fn parse_patient_id(raw: &str) -> Result<PatientID, AppError> {
    raw.parse()
        .map(PatientID)
        .map_err(|_| AppError::bad_request(INVALID_PATIENT_ID))
}

fn parse_user_id(raw: &str) -> Result<UserID, AppError> {
    raw.parse()
        .map(UserID)
        .map_err(|_| AppError::bad_request(INVALID_USER_ID))
}

/// Lit un corps JSON et applique ses règles de validation déclaratives
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(body) = payload.map_err(|_| AppError::bad_request(INVALID_BODY))?;
    body.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    Ok(body)
}

// ---------------------------------- Utilisateurs -------------------------------------------

/// Crée un compte sans émettre de token
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|_| AppError::bad_request(INVALID_BODY))?;
    let user = state
        .auth
        .create_account(&request.username, &request.password, &request.role)?;
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserView> = state.users.list()?.iter().map(UserView::from).collect();
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get_by_id(parse_user_id(&raw_id)?)?;
    Ok(Json(UserView::from(&user)))
}

pub async fn current_user(user: AuthenticatedUser) -> impl IntoResponse {
    Json(UserView::from(user.user()))
}

// ---------------------------------- Patients -------------------------------------------

pub async fn list_patients(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|_| AppError::bad_request("Invalid pagination parameters"))?;
    let page = state.patients.list(query.page, query.limit)?;
    Ok(Json(PatientPageResponse::from(page)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let patient = state.patients.get_by_id(parse_patient_id(&raw_id)?)?;
    Ok(Json(PatientView::from(&patient)))
}

/// Réservé aux réceptionnistes
pub async fn create_patient(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = validated(payload)?;
    let patient = state.patients.create(&input, user.id())?;
    Ok((StatusCode::CREATED, Json(PatientView::from(&patient))))
}

/// Réservé aux réceptionnistes
pub async fn update_patient(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_patient_id(&raw_id)?;
    let input = validated(payload)?;
    let patient = state.patients.update(id, &input)?;
    Ok(Json(PatientView::from(&patient)))
}

/// Réservé aux médecins
pub async fn update_medical_notes(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<MedicalNotesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_patient_id(&raw_id)?;
    let request = validated(payload)?;
    state.patients.update_medical_notes(id, &request.medical_notes)?;

    let patient = state.patients.get_by_id(id)?;
    Ok(Json(PatientView::from(&patient)))
}

/// Réservé aux réceptionnistes
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.patients.delete(parse_patient_id(&raw_id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Réservé aux réceptionnistes
pub async fn search_patients(
    State(state): State<AppState>,
    query: Result<Query<PatientSearch>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(filters) = query.map_err(|_| AppError::bad_request(INVALID_SEARCH))?;
    let patients: Vec<PatientView> = state
        .patients
        .search(&filters)?
        .iter()
        .map(PatientView::from)
        .collect();
    Ok(Json(patients))
}
