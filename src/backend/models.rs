//! Définitions des structures pour les interactions avec l'API.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::consts::MAX_CONTENT_LENGTH;
use crate::models::{empty_as_none, PatientPage, PatientView};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Corps d'une inscription ou d'une création de compte
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MedicalNotesRequest {
    #[validate(length(max = MAX_CONTENT_LENGTH))]
    pub medical_notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatientPageResponse {
    pub patients: Vec<PatientView>,
    pub total: u64,
    pub page: i64,
    pub limit: i64,
}

impl From<PatientPage> for PatientPageResponse {
    fn from(page: PatientPage) -> Self {
        Self {
            patients: page.patients.iter().map(PatientView::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}
