// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Patient repository (the credential store).
//!
//! Username, email and password digest are each unique across all patients.
//! The digest is a bcrypt string and is never returned by the API.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{
    decode, encode, next_id, Database, PATIENTS, PATIENT_DIGESTS, PATIENT_EMAILS,
    PATIENT_SEQUENCE, PATIENT_USERNAMES,
};
use super::super::{PatientId, StorageError, StorageResult, UniqueField};

/// Patient stored in the `patients` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPatient {
    pub id: PatientId,
    pub username: String,
    pub email: String,
    /// bcrypt digest (salt and cost embedded)
    pub password_hash: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields required to register a patient. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub fullname: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Unique login identifiers a patient can be looked up by.
#[derive(Debug, Clone, Copy)]
pub enum PatientKey<'k> {
    Username(&'k str),
    Email(&'k str),
}

/// Repository for patient operations.
pub struct PatientRepository<'a> {
    db: &'a Database,
}

impl<'a> PatientRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Check whether a patient with this username or email exists.
    pub fn exists_by(&self, key: PatientKey<'_>) -> StorageResult<bool> {
        Ok(self.id_by(key)?.is_some())
    }

    /// Get a patient by id.
    pub fn find_by_id(&self, id: PatientId) -> StorageResult<Option<StoredPatient>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PATIENTS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a patient by email (the login identifier).
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredPatient>> {
        match self.id_by(PatientKey::Email(email))? {
            Some(id) => self.find_by_id(id),
            None => Ok(None),
        }
    }

    /// Insert a new patient, enforcing every uniqueness constraint.
    ///
    /// Email is checked before username, then the digest.
    pub fn insert(&self, new: NewPatient) -> StorageResult<StoredPatient> {
        let write_txn = self.db.begin_write()?;
        let patient = {
            let mut emails = write_txn.open_table(PATIENT_EMAILS)?;
            if emails.get(new.email.as_str())?.is_some() {
                return Err(StorageError::Conflict(UniqueField::Email));
            }
            let mut usernames = write_txn.open_table(PATIENT_USERNAMES)?;
            if usernames.get(new.username.as_str())?.is_some() {
                return Err(StorageError::Conflict(UniqueField::Username));
            }
            let mut digests = write_txn.open_table(PATIENT_DIGESTS)?;
            if digests.get(new.password_hash.as_str())?.is_some() {
                return Err(StorageError::Conflict(UniqueField::PasswordDigest));
            }

            let id = next_id(&write_txn, PATIENT_SEQUENCE)?;
            let patient = StoredPatient {
                id,
                username: new.username,
                email: new.email,
                password_hash: new.password_hash,
                fullname: new.fullname,
                phone: new.phone,
                address: new.address,
                created_at: Utc::now(),
                updated_at: None,
            };

            emails.insert(patient.email.as_str(), id)?;
            usernames.insert(patient.username.as_str(), id)?;
            digests.insert(patient.password_hash.as_str(), id)?;

            let mut patients = write_txn.open_table(PATIENTS)?;
            patients.insert(id, encode(&patient)?.as_slice())?;
            patient
        };
        write_txn.commit()?;

        tracing::info!(patient_id = patient.id, "Patient created");
        Ok(patient)
    }

    fn id_by(&self, key: PatientKey<'_>) -> StorageResult<Option<PatientId>> {
        let read_txn = self.db.begin_read()?;
        let (table, value) = match key {
            PatientKey::Username(username) => (PATIENT_USERNAMES, username),
            PatientKey::Email(email) => (PATIENT_EMAILS, email),
        };
        let table = read_txn.open_table(table)?;
        Ok(table.get(value)?.map(|id| id.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::temp_db;

    fn new_patient(username: &str, email: &str, digest: &str) -> NewPatient {
        NewPatient {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: digest.to_string(),
            fullname: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn insert_and_find() {
        let (db, _dir) = temp_db();
        let repo = PatientRepository::new(&db);

        let created = repo
            .insert(new_patient("alice1", "a@x.com", "digest-a"))
            .unwrap();
        assert_eq!(created.id, 1);

        let by_id = repo.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(by_id, created);

        let by_email = repo.find_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.username, "alice1");

        assert!(repo.find_by_email("nobody@x.com").unwrap().is_none());
        assert!(repo.find_by_id(99).unwrap().is_none());
    }

    #[test]
    fn exists_by_username_and_email() {
        let (db, _dir) = temp_db();
        let repo = PatientRepository::new(&db);
        repo.insert(new_patient("alice1", "a@x.com", "digest-a"))
            .unwrap();

        assert!(repo.exists_by(PatientKey::Username("alice1")).unwrap());
        assert!(repo.exists_by(PatientKey::Email("a@x.com")).unwrap());
        assert!(!repo.exists_by(PatientKey::Username("bob22")).unwrap());
        assert!(!repo.exists_by(PatientKey::Email("b@x.com")).unwrap());
    }

    #[test]
    fn duplicate_email_conflicts() {
        let (db, _dir) = temp_db();
        let repo = PatientRepository::new(&db);
        repo.insert(new_patient("alice1", "a@x.com", "digest-a"))
            .unwrap();

        let result = repo.insert(new_patient("alice2", "a@x.com", "digest-b"));
        assert!(matches!(
            result,
            Err(StorageError::Conflict(UniqueField::Email))
        ));
    }

    #[test]
    fn duplicate_username_conflicts() {
        let (db, _dir) = temp_db();
        let repo = PatientRepository::new(&db);
        repo.insert(new_patient("alice1", "a@x.com", "digest-a"))
            .unwrap();

        let result = repo.insert(new_patient("alice1", "other@x.com", "digest-b"));
        assert!(matches!(
            result,
            Err(StorageError::Conflict(UniqueField::Username))
        ));
    }

    #[test]
    fn duplicate_digest_conflicts() {
        let (db, _dir) = temp_db();
        let repo = PatientRepository::new(&db);
        repo.insert(new_patient("alice1", "a@x.com", "digest-a"))
            .unwrap();

        let result = repo.insert(new_patient("bob22", "b@x.com", "digest-a"));
        assert!(matches!(
            result,
            Err(StorageError::Conflict(UniqueField::PasswordDigest))
        ));
    }

    #[test]
    fn failed_insert_leaves_no_trace() {
        let (db, _dir) = temp_db();
        let repo = PatientRepository::new(&db);
        repo.insert(new_patient("alice1", "a@x.com", "digest-a"))
            .unwrap();

        // Username taken: the new email must not be reserved either.
        let _ = repo.insert(new_patient("alice1", "fresh@x.com", "digest-b"));
        assert!(!repo.exists_by(PatientKey::Email("fresh@x.com")).unwrap());

        // Ids continue from the last committed insert.
        let next = repo
            .insert(new_patient("bob22", "b@x.com", "digest-c"))
            .unwrap();
        assert_eq!(next.id, 2);
    }
}
