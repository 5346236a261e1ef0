//! Stockage des données en mémoire, avec sauvegarde en YAML
//!
//! Les services ne voient que les traits [`UserStore`] et [`PatientStore`].
//! [`Database`] les implémente tous les deux ; les contraintes d'unicité
//! (nom d'utilisateur, nom ou contact d'un patient) sont vérifiées sous le
//! verrou d'écriture, au moment même de l'insertion.

use std::{
    collections::BTreeMap,
    fs::{create_dir_all, File},
    io::{self, ErrorKind::NotFound},
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{
    NewPatient, NewUser, Patient, PatientID, PatientSearch, UserData, UserID,
};

#[derive(Debug, Error)]
pub enum DBError {
    #[error("user not found")]
    UserNotFound,

    #[error("patient not found")]
    PatientNotFound,

    #[error("User already exists: {username}")]
    UserAlreadyExists { username: String },

    #[error("patient with this name or contact info already exists")]
    DuplicatePatient,

    #[error("DB poisoned")]
    Poisoned,

    #[error("Failed to persist DB: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize DB: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Accès aux comptes utilisateurs
pub trait UserStore: Send + Sync {
    fn create(&self, user: NewUser) -> Result<UserData, DBError>;
    fn find_by_id(&self, id: UserID) -> Result<UserData, DBError>;
    fn find_by_username(&self, username: &str) -> Result<UserData, DBError>;
    fn update(&self, user: UserData) -> Result<UserData, DBError>;
    fn delete(&self, id: UserID) -> Result<(), DBError>;
    fn list(&self) -> Result<Vec<UserData>, DBError>;
}

/// Accès aux dossiers patients
pub trait PatientStore: Send + Sync {
    fn create(&self, patient: NewPatient) -> Result<Patient, DBError>;
    fn find_by_id(&self, id: PatientID) -> Result<Patient, DBError>;
    /// Remplace tous les champs modifiables (pas le créateur ni la date de création)
    fn update(&self, id: PatientID, patient: NewPatient) -> Result<Patient, DBError>;
    /// Seule mise à jour partielle autorisée
    fn update_medical_notes(&self, id: PatientID, notes: &str) -> Result<Patient, DBError>;
    fn delete(&self, id: PatientID) -> Result<(), DBError>;
    /// Une tranche ordonnée par identifiant, et le nombre total de dossiers
    fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Patient>, u64), DBError>;
    fn search(&self, filters: &PatientSearch) -> Result<Vec<Patient>, DBError>;
    fn exists_by_name_or_contact(&self, name: &str, contact_info: &str) -> Result<bool, DBError>;
}

#[derive(Clone, Serialize, Deserialize, Default)]
struct Tables {
    next_user_id: u64,
    next_patient_id: u64,
    users: BTreeMap<UserID, UserData>,
    patients: BTreeMap<PatientID, Patient>,
}

impl Tables {
    /// Cherche un patient (autre que `except`) qui partage le nom OU le contact
    fn collides(&self, name: &str, contact_info: &str, except: Option<PatientID>) -> bool {
        self.patients.values().any(|p| {
            Some(p.id) != except && (p.name == name || p.contact_info == contact_info)
        })
    }
}

#[derive(Default)]
pub struct Database {
    path: Option<PathBuf>,
    tables: RwLock<Tables>,
}

impl Database {
    /// Base purement en mémoire
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Ouvre la base sauvegardée dans `path`, ou en crée une vide
    pub fn open(path: PathBuf) -> Result<Self, DBError> {
        match File::open(&path) {
            Ok(f) => {
                let tables: Tables = serde_yaml::from_reader(f)?;
                info!(
                    "Loaded {} users and {} patients from {}",
                    tables.users.len(),
                    tables.patients.len(),
                    path.display()
                );
                Ok(Self {
                    path: Some(path),
                    tables: RwLock::new(tables),
                })
            }

            // Fichier non existant, on le crée
            Err(not_found) if not_found.kind() == NotFound => {
                info!("DB file not found, creating new empty DB");
                let db = Self {
                    path: Some(path),
                    tables: RwLock::default(),
                };
                db.save(&*db.read()?)?;
                Ok(db)
            }

            Err(other) => Err(other.into()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DBError> {
        self.tables.read().or(Err(DBError::Poisoned))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DBError> {
        self.tables.write().or(Err(DBError::Poisoned))
    }

    /// Applique `change` sous le verrou d'écriture. Avec une sauvegarde,
    /// le changement est fait sur une copie qui ne remplace les tables
    /// qu'une fois écrite sur disque : un échec laisse la base intacte.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Tables) -> Result<T, DBError>,
    ) -> Result<T, DBError> {
        let mut tables = self.write()?;

        if self.path.is_none() {
            return change(&mut *tables);
        }

        let mut staged = tables.clone();
        let result = change(&mut staged)?;
        self.save(&staged)?;
        *tables = staged;
        Ok(result)
    }

    /// Écrit un fichier temporaire à côté de la sauvegarde puis le renomme
    fn save(&self, tables: &Tables) -> Result<(), DBError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        if !parent_dir.exists() {
            create_dir_all(parent_dir)?;
        }

        let mut file = NamedTempFile::new_in(parent_dir)?;
        serde_yaml::to_writer(&mut file, tables)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl UserStore for Database {
    fn create(&self, user: NewUser) -> Result<UserData, DBError> {
        self.mutate(|tables| {
            if tables.users.values().any(|u| u.username == user.username) {
                return Err(DBError::UserAlreadyExists {
                    username: user.username,
                });
            }

            tables.next_user_id += 1;
            let now = Utc::now();
            let stored = UserData {
                id: UserID(tables.next_user_id),
                username: user.username,
                password: user.password,
                role: user.role,
                created_at: now,
                updated_at: now,
            };
            tables.users.insert(stored.id, stored.clone());
            Ok(stored)
        })
    }

    fn find_by_id(&self, id: UserID) -> Result<UserData, DBError> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or(DBError::UserNotFound)
    }

    fn find_by_username(&self, username: &str) -> Result<UserData, DBError> {
        self.read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DBError::UserNotFound)
    }

    fn update(&self, user: UserData) -> Result<UserData, DBError> {
        self.mutate(|tables| {
            if tables
                .users
                .values()
                .any(|u| u.id != user.id && u.username == user.username)
            {
                return Err(DBError::UserAlreadyExists {
                    username: user.username,
                });
            }

            let existing = tables.users.get_mut(&user.id).ok_or(DBError::UserNotFound)?;
            existing.username = user.username;
            existing.password = user.password;
            existing.role = user.role;
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        })
    }

    fn delete(&self, id: UserID) -> Result<(), DBError> {
        self.mutate(|tables| {
            tables.users.remove(&id).ok_or(DBError::UserNotFound)?;
            Ok(())
        })
    }

    fn list(&self) -> Result<Vec<UserData>, DBError> {
        Ok(self.read()?.users.values().cloned().collect())
    }
}

impl PatientStore for Database {
    fn create(&self, patient: NewPatient) -> Result<Patient, DBError> {
        self.mutate(|tables| {
            if tables.collides(&patient.name, &patient.contact_info, None) {
                return Err(DBError::DuplicatePatient);
            }

            tables.next_patient_id += 1;
            let now = Utc::now();
            let stored = Patient {
                id: PatientID(tables.next_patient_id),
                name: patient.name,
                age: patient.age,
                gender: patient.gender,
                contact_info: patient.contact_info,
                medical_notes: patient.medical_notes,
                created_by: patient.created_by,
                created_at: now,
                updated_at: now,
            };
            tables.patients.insert(stored.id, stored.clone());
            Ok(stored)
        })
    }

    fn find_by_id(&self, id: PatientID) -> Result<Patient, DBError> {
        self.read()?
            .patients
            .get(&id)
            .cloned()
            .ok_or(DBError::PatientNotFound)
    }

    fn update(&self, id: PatientID, patient: NewPatient) -> Result<Patient, DBError> {
        self.mutate(|tables| {
            if !tables.patients.contains_key(&id) {
                return Err(DBError::PatientNotFound);
            }
            if tables.collides(&patient.name, &patient.contact_info, Some(id)) {
                return Err(DBError::DuplicatePatient);
            }

            let existing = tables.patients.get_mut(&id).ok_or(DBError::PatientNotFound)?;
            existing.name = patient.name;
            existing.age = patient.age;
            existing.gender = patient.gender;
            existing.contact_info = patient.contact_info;
            existing.medical_notes = patient.medical_notes;
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        })
    }

    fn update_medical_notes(&self, id: PatientID, notes: &str) -> Result<Patient, DBError> {
        self.mutate(|tables| {
            let existing = tables.patients.get_mut(&id).ok_or(DBError::PatientNotFound)?;
            existing.medical_notes = notes.to_string();
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        })
    }

    fn delete(&self, id: PatientID) -> Result<(), DBError> {
        self.mutate(|tables| {
            tables.patients.remove(&id).ok_or(DBError::PatientNotFound)?;
            Ok(())
        })
    }

    fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Patient>, u64), DBError> {
        let tables = self.read()?;
        let total = tables.patients.len() as u64;
        let rows = tables
            .patients
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok((rows, total))
    }

    fn search(&self, filters: &PatientSearch) -> Result<Vec<Patient>, DBError> {
        Ok(self
            .read()?
            .patients
            .values()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect())
    }

    fn exists_by_name_or_contact(&self, name: &str, contact_info: &str) -> Result<bool, DBError> {
        Ok(self.read()?.collides(name, contact_info, None))
    }
}
