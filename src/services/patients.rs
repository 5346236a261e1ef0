//! Gestion des dossiers patients : validation, unicité, recherche et pagination.

use std::sync::Arc;

use log::info;

use super::ServiceError;
use crate::consts::{DEFAULT_PAGE_LIMIT, MAX_AGE, MAX_PAGE_LIMIT};
use crate::db::PatientStore;
use crate::models::{Patient, PatientID, PatientInput, PatientPage, PatientSearch, UserID};
use crate::utils::input_validation::patient_validation;

pub struct PatientService {
    patients: Arc<dyn PatientStore>,
}

/// Ramène une page et une taille de page demandées dans les bornes admises
pub fn clamp_page(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = match limit {
        Some(limit) if limit >= 1 => limit.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    };
    (page, limit)
}

fn require_id(id: PatientID) -> Result<(), ServiceError> {
    if id.is_unset() {
        return Err(ServiceError::validation("invalid patient ID"));
    }
    Ok(())
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientStore>) -> Self {
        Self { patients }
    }

    /// Crée un dossier. Refusé si un patient porte déjà ce nom OU ce contact.
    pub fn create(&self, input: &PatientInput, created_by: UserID) -> Result<Patient, ServiceError> {
        let patient = patient_validation(input, created_by).map_err(ServiceError::validation)?;

        if self
            .patients
            .exists_by_name_or_contact(&patient.name, &patient.contact_info)?
        {
            return Err(ServiceError::DuplicatePatient);
        }

        let stored = self.patients.create(patient)?;
        info!("Patient {} created by user {}", stored.id, created_by);
        Ok(stored)
    }

    pub fn get_by_id(&self, id: PatientID) -> Result<Patient, ServiceError> {
        require_id(id)?;
        Ok(self.patients.find_by_id(id)?)
    }

    /// Remplace tous les champs modifiables d'un dossier existant
    pub fn update(&self, id: PatientID, input: &PatientInput) -> Result<Patient, ServiceError> {
        require_id(id)?;
        let existing = self.patients.find_by_id(id)?;

        // The creator is not part of the input and never changes
        let patient =
            patient_validation(input, existing.created_by).map_err(ServiceError::validation)?;

        let updated = self.patients.update(id, patient)?;
        info!("Patient {} updated", id);
        Ok(updated)
    }

    /// Ne modifie que les notes médicales
    pub fn update_medical_notes(&self, id: PatientID, notes: &str) -> Result<Patient, ServiceError> {
        require_id(id)?;
        self.patients.find_by_id(id)?;

        let updated = self.patients.update_medical_notes(id, notes)?;
        info!("Medical notes of patient {} updated", id);
        Ok(updated)
    }

    pub fn delete(&self, id: PatientID) -> Result<(), ServiceError> {
        require_id(id)?;
        self.patients.delete(id)?;
        info!("Patient {} deleted", id);
        Ok(())
    }

    /// Liste paginée. Le total porte sur tous les dossiers.
    pub fn list(&self, page: Option<i64>, limit: Option<i64>) -> Result<PatientPage, ServiceError> {
        let (page, limit) = clamp_page(page, limit);
        // Both are >= 1 after clamping
        let offset = (page as u64 - 1).saturating_mul(limit as u64);
        let (patients, total) = self.patients.list(offset, limit as u64)?;

        Ok(PatientPage {
            patients,
            total,
            page,
            limit,
        })
    }

    pub fn search(&self, filters: &PatientSearch) -> Result<Vec<Patient>, ServiceError> {
        let age_min = filters.age_min.unwrap_or(0);
        let age_max = filters.age_max.unwrap_or(0);

        if age_min < 0 {
            return Err(ServiceError::validation("minimum age cannot be negative"));
        }
        if age_max > MAX_AGE {
            return Err(ServiceError::validation("maximum age cannot exceed 150"));
        }
        if age_max > 0 && age_min > age_max {
            return Err(ServiceError::validation(
                "minimum age cannot be greater than maximum age",
            ));
        }

        Ok(self.patients.search(filters)?)
    }
}
