//! Modèle de données

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use strum_macros::{Display, EnumIter, EnumString};
use validator::Validate;

use crate::consts::{MAX_CONTENT_LENGTH, MAX_SHORT_CONTENT_LENGTH};
use crate::utils::password_utils::PWHash;

/// Role d'un utilisateur: Médecin ou Réceptionniste.
///
/// Le rôle est un ensemble fermé : toute autre valeur est rejetée
/// à la désérialisation, que ce soit depuis une requête, un token
/// ou la sauvegarde de la base.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Doctor,
    Receptionist,
}

/// Genre d'un patient
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Un identifiant numérique d'utilisateur, attribué par la base.
/// La valeur 0 signifie "pas d'identifiant".
#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct UserID(pub u64);

impl UserID {
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

/// Un identifiant numérique de patient, attribué par la base.
#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct PatientID(pub u64);

impl PatientID {
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

/// Un compte utilisateur tel que stocké. Contient le hash du mot de passe :
/// ne jamais renvoyer tel quel à un client, utiliser [`UserView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub id: UserID,
    pub username: String,
    pub password: PWHash,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Un compte à créer, avant que la base ne lui attribue un identifiant
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: PWHash,
    pub role: Role,
}

/// Vue d'un utilisateur sans données sensibles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserID,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserData> for UserView {
    fn from(user: &UserData) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Un dossier patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientID,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub contact_info: String,
    pub medical_notes: String,
    pub created_by: UserID,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Les champs d'un patient déjà validés, prêts à être stockés
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub contact_info: String,
    pub medical_notes: String,
    pub created_by: UserID,
}

/// Vue d'un patient renvoyée aux clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientView {
    pub id: PatientID,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub contact_info: String,
    pub medical_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Patient> for PatientView {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender,
            contact_info: patient.contact_info.clone(),
            medical_notes: patient.medical_notes.clone(),
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// Données brutes d'un patient, telles que reçues pour une création
/// ou une mise à jour complète. Les contrôles de présence et de bornes
/// sont faits par le service ; ici on ne borne que la taille des champs.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PatientInput {
    #[validate(length(max = MAX_SHORT_CONTENT_LENGTH), non_control_character)]
    pub name: String,
    pub age: Option<i32>,
    pub gender: String,
    #[validate(length(max = MAX_SHORT_CONTENT_LENGTH), non_control_character)]
    pub contact_info: String,
    #[validate(length(max = MAX_CONTENT_LENGTH))]
    pub medical_notes: String,
}

/// Filtres de recherche. Un filtre absent (ou un âge à 0) ne contraint rien ;
/// les filtres présents se combinent en ET.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PatientSearch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub age_min: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub age_max: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub gender: Option<Gender>,
    pub contact_info: Option<String>,
}

/// Lit un paramètre de requête optionnel ; une valeur vide (`?gender=`,
/// envoyée par un formulaire laissé blanc) compte comme absente.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl PatientSearch {
    /// Vérifie si un patient satisfait tous les filtres présents
    pub fn matches(&self, patient: &Patient) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        let name_ok = match self.name.as_deref() {
            Some(name) if !name.is_empty() => contains_ci(&patient.name, name),
            _ => true,
        };
        let min_ok = match self.age_min {
            Some(min) if min != 0 => patient.age >= min,
            _ => true,
        };
        let max_ok = match self.age_max {
            Some(max) if max != 0 => patient.age <= max,
            _ => true,
        };
        let gender_ok = self.gender.map_or(true, |g| patient.gender == g);
        let contact_ok = match self.contact_info.as_deref() {
            Some(contact) if !contact.is_empty() => contains_ci(&patient.contact_info, contact),
            _ => true,
        };

        name_ok && min_ok && max_ok && gender_ok && contact_ok
    }
}

/// Une page de patients, avec le nombre total de dossiers
#[derive(Debug, Clone)]
pub struct PatientPage {
    pub patients: Vec<Patient>,
    pub total: u64,
    pub page: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn patient(name: &str, age: i32, gender: Gender, contact: &str) -> Patient {
        let now = Utc::now();
        Patient {
            id: PatientID(1),
            name: name.to_string(),
            age,
            gender,
            contact_info: contact.to_string(),
            medical_notes: String::new(),
            created_by: UserID(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_parsing_is_closed() {
        assert_eq!(Role::from_str("doctor").unwrap(), Role::Doctor);
        assert_eq!(Role::from_str("receptionist").unwrap(), Role::Receptionist);
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("Doctor").is_err());
        assert!(serde_json::from_str::<Role>("\"nurse\"").is_err());
        assert_eq!(Role::Doctor.to_string(), "doctor");
    }

    #[test]
    fn test_display_and_serde_agree() {
        for role in Role::iter() {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
        for gender in Gender::iter() {
            let json = serde_json::to_string(&gender).unwrap();
            assert_eq!(json, format!("\"{gender}\""));
        }
    }

    #[test]
    fn test_gender_serialization() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(Gender::from_str("other").unwrap(), Gender::Other);
        assert!(Gender::from_str("").is_err());
    }

    #[test]
    fn test_user_view_has_no_password() {
        let now = Utc::now();
        let user = UserData {
            id: UserID(3),
            username: "alice".to_string(),
            password: crate::utils::password_utils::hash("secret1").unwrap(),
            role: Role::Doctor,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(UserView::from(&user)).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "doctor");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_search_matches_case_insensitive_substrings() {
        let p = patient("Jean Dupont", 42, Gender::Male, "+41 79 123 45 67");
        let search = PatientSearch {
            name: Some("dupo".to_string()),
            contact_info: Some("79 123".to_string()),
            ..Default::default()
        };
        assert!(search.matches(&p));

        let search = PatientSearch {
            name: Some("martin".to_string()),
            ..Default::default()
        };
        assert!(!search.matches(&p));
    }

    #[test]
    fn test_search_filters_compose_with_and() {
        let p = patient("Anna", 30, Gender::Female, "anna@example.com");
        let search = PatientSearch {
            age_min: Some(20),
            age_max: Some(40),
            gender: Some(Gender::Female),
            ..Default::default()
        };
        assert!(search.matches(&p));

        let search = PatientSearch {
            age_min: Some(20),
            gender: Some(Gender::Male),
            ..Default::default()
        };
        assert!(!search.matches(&p));
    }

    #[test]
    fn test_zero_age_filters_are_ignored() {
        let p = patient("Bob", 70, Gender::Other, "bob");
        let search = PatientSearch {
            age_min: Some(0),
            age_max: Some(0),
            ..Default::default()
        };
        assert!(search.matches(&p));
    }

    fn parse_query(query: &str) -> Result<PatientSearch, String> {
        let uri: axum::http::Uri = format!("/api/patients/search?{query}").parse().unwrap();
        axum::extract::Query::<PatientSearch>::try_from_uri(&uri)
            .map(|q| q.0)
            .map_err(|e| e.body_text())
    }

    #[test]
    fn test_blank_query_values_are_absent_filters() {
        assert_eq!(parse_query("gender=").unwrap(), PatientSearch::default());
        assert_eq!(
            parse_query("age_min=&age_max=10").unwrap(),
            PatientSearch {
                age_max: Some(10),
                ..Default::default()
            }
        );
        assert_eq!(
            parse_query("gender=female&age_min=5").unwrap(),
            PatientSearch {
                gender: Some(Gender::Female),
                age_min: Some(5),
                ..Default::default()
            }
        );
        assert_eq!(parse_query("").unwrap(), PatientSearch::default());
    }

    #[test]
    fn test_bad_query_values_are_still_rejected() {
        assert!(parse_query("gender=unknown").is_err());
        assert!(parse_query("age_min=ten").is_err());
    }

    #[test]
    fn test_patient_input_length_caps() {
        let input = PatientInput {
            name: "a".repeat(MAX_SHORT_CONTENT_LENGTH as usize + 1),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let input = PatientInput {
            name: "Claire".to_string(),
            contact_info: "0791234567".to_string(),
            medical_notes: "allergic to penicillin".to_string(),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
