//! Contrôles des entrées : identifiants de connexion et champs d'un patient.
//!
//! Chaque fonction renvoie le message destiné au client en cas d'échec.

use std::str::FromStr;

use crate::consts::{MAX_AGE, MIN_AGE, MIN_PASSWORD_LENGTH};
use crate::models::{Gender, NewPatient, PatientInput, Role, UserID};

/// Interprète un rôle reçu en texte. Seuls `doctor` et `receptionist` existent.
pub fn parse_role(raw: &str) -> Option<Role> {
    Role::from_str(raw).ok()
}

/// Vérifie un couple nom d'utilisateur / mot de passe à l'inscription
pub fn credentials_validation(username: &str, password: &str) -> Result<(), &'static str> {
    if username.is_empty() || password.is_empty() {
        return Err("Username and password are required");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

pub fn age_validation(age: i32) -> bool {
    (MIN_AGE..=MAX_AGE).contains(&age)
}

/// Valide tous les champs d'un patient et produit sa forme typée
pub fn patient_validation(
    input: &PatientInput,
    created_by: UserID,
) -> Result<NewPatient, &'static str> {
    if input.name.is_empty() {
        return Err("patient name is required");
    }
    let age = input.age.ok_or("patient age is required")?;
    if !age_validation(age) {
        return Err("invalid patient age");
    }
    if input.gender.is_empty() {
        return Err("patient gender is required");
    }
    let gender = Gender::from_str(&input.gender).map_err(|_| "invalid patient gender")?;
    if input.contact_info.is_empty() {
        return Err("patient contact information is required");
    }
    if created_by.is_unset() {
        return Err("creator ID is required");
    }

    Ok(NewPatient {
        name: input.name.clone(),
        age,
        gender,
        contact_info: input.contact_info.clone(),
        medical_notes: input.medical_notes.clone(),
        created_by,
    })
}
