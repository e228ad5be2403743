// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prescription repository.
//!
//! Every method takes the caller's patient id and only ever touches rows
//! owned by it. Rows of other owners behave as if they did not exist.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{
    decode, encode, next_id, owner_key, owner_range, Database, PRESCRIPTIONS,
    PRESCRIPTIONS_BY_OWNER, PRESCRIPTION_SEQUENCE,
};
use super::super::{
    OwnedResource, OwnershipCheck, Page, PageRequest, PatientId, PrescriptionId, StorageResult,
};

/// Prescription stored in the `prescriptions` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPrescription {
    pub id: PrescriptionId,
    /// Owning patient
    pub user_id: PatientId,
    pub title: String,
    pub body: String,
    pub expedition_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for StoredPrescription {
    fn owner_id(&self) -> PatientId {
        self.user_id
    }

    fn resource_name() -> &'static str {
        "Prescription"
    }

    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPrescription {
    pub title: String,
    pub body: String,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PrescriptionChanges {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Repository for prescription operations.
pub struct PrescriptionRepository<'a> {
    db: &'a Database,
}

impl<'a> PrescriptionRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a prescription owned by `owner_id`.
    pub fn insert(
        &self,
        owner_id: PatientId,
        new: NewPrescription,
    ) -> StorageResult<StoredPrescription> {
        let write_txn = self.db.begin_write()?;
        let prescription = {
            let id = next_id(&write_txn, PRESCRIPTION_SEQUENCE)?;
            let now = Utc::now();
            let prescription = StoredPrescription {
                id,
                user_id: owner_id,
                title: new.title,
                body: new.body,
                expedition_date: now,
                created_at: now,
                updated_at: None,
            };

            let mut table = write_txn.open_table(PRESCRIPTIONS)?;
            table.insert(id, encode(&prescription)?.as_slice())?;

            let mut index = write_txn.open_table(PRESCRIPTIONS_BY_OWNER)?;
            index.insert(owner_key(owner_id, id).as_slice(), id)?;
            prescription
        };
        write_txn.commit()?;

        tracing::info!(
            prescription_id = prescription.id,
            patient_id = owner_id,
            "Prescription created"
        );
        Ok(prescription)
    }

    /// Get one prescription of `owner_id`.
    ///
    /// # Errors
    /// `StorageError::NotFound` if it does not exist or belongs to someone else.
    pub fn find_by_id(
        &self,
        owner_id: PatientId,
        id: PrescriptionId,
    ) -> StorageResult<StoredPrescription> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRESCRIPTIONS)?;
        let found: Option<StoredPrescription> = match table.get(id)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        found.owned_by(owner_id)
    }

    /// One page of `owner_id`'s prescriptions, ordered by id.
    pub fn find_by_owner(
        &self,
        owner_id: PatientId,
        request: PageRequest,
    ) -> StorageResult<Page<StoredPrescription>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(PRESCRIPTIONS_BY_OWNER)?;
        let table = read_txn.open_table(PRESCRIPTIONS)?;

        let (start, end) = owner_range(owner_id);
        let offset = request.offset();
        let limit = request.per_page();

        let mut total = 0u64;
        let mut items = Vec::new();
        for entry in index.range(start.as_slice()..=end.as_slice())? {
            let (_, id) = entry?;
            if total >= offset && (items.len() as u64) < limit {
                if let Some(value) = table.get(id.value())? {
                    items.push(decode::<StoredPrescription>(value.value())?);
                }
            }
            total += 1;
        }

        Ok(Page {
            items,
            request,
            total,
        })
    }

    /// Apply `changes` to one of `owner_id`'s prescriptions.
    pub fn update(
        &self,
        owner_id: PatientId,
        id: PrescriptionId,
        changes: PrescriptionChanges,
    ) -> StorageResult<StoredPrescription> {
        let write_txn = self.db.begin_write()?;
        let prescription = {
            let mut table = write_txn.open_table(PRESCRIPTIONS)?;

            // Read existing value and deserialize before mutating
            let existing: Option<StoredPrescription> = match table.get(id)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            let mut prescription = existing.owned_by(owner_id)?;

            if let Some(title) = changes.title {
                prescription.title = title;
            }
            if let Some(body) = changes.body {
                prescription.body = body;
            }
            prescription.updated_at = Some(Utc::now());

            table.insert(id, encode(&prescription)?.as_slice())?;
            prescription
        };
        write_txn.commit()?;

        tracing::info!(prescription_id = id, patient_id = owner_id, "Prescription updated");
        Ok(prescription)
    }

    /// Delete one of `owner_id`'s prescriptions.
    pub fn delete(&self, owner_id: PatientId, id: PrescriptionId) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRESCRIPTIONS)?;
            let existing: Option<StoredPrescription> = match table.get(id)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            existing.owned_by(owner_id)?;

            table.remove(id)?;
            let mut index = write_txn.open_table(PRESCRIPTIONS_BY_OWNER)?;
            index.remove(owner_key(owner_id, id).as_slice())?;
        }
        write_txn.commit()?;

        tracing::info!(prescription_id = id, patient_id = owner_id, "Prescription deleted");
        Ok(())
    }
}
