// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded database handle and table definitions.

use std::path::Path;

use redb::{ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{de::DeserializeOwned, Serialize};

use super::{PatientId, PrescriptionId, StorageResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: patient_id → serialized StoredPatient (JSON bytes).
pub(crate) const PATIENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("patients");

/// Unique index: username → patient_id.
pub(crate) const PATIENT_USERNAMES: TableDefinition<&str, u64> =
    TableDefinition::new("patient_usernames");

/// Unique index: email → patient_id.
pub(crate) const PATIENT_EMAILS: TableDefinition<&str, u64> =
    TableDefinition::new("patient_emails");

/// Unique index: password digest → patient_id.
pub(crate) const PATIENT_DIGESTS: TableDefinition<&str, u64> =
    TableDefinition::new("patient_digests");

/// Primary table: prescription_id → serialized StoredPrescription (JSON bytes).
pub(crate) const PRESCRIPTIONS: TableDefinition<u64, &[u8]> =
    TableDefinition::new("prescriptions");

/// Index: `owner_id_be | prescription_id_be` → prescription_id.
///
/// Big-endian encoding keeps each owner's rows contiguous and ordered by id.
pub(crate) const PRESCRIPTIONS_BY_OWNER: TableDefinition<&[u8], u64> =
    TableDefinition::new("prescriptions_by_owner");

/// Sequence name → last issued id.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

pub(crate) const PATIENT_SEQUENCE: &str = "patients";
pub(crate) const PRESCRIPTION_SEQUENCE: &str = "prescriptions";

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID database holding patients and prescriptions.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PATIENTS)?;
            let _ = write_txn.open_table(PATIENT_USERNAMES)?;
            let _ = write_txn.open_table(PATIENT_EMAILS)?;
            let _ = write_txn.open_table(PATIENT_DIGESTS)?;
            let _ = write_txn.open_table(PRESCRIPTIONS)?;
            let _ = write_txn.open_table(PRESCRIPTIONS_BY_OWNER)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self { db })
    }

    pub(crate) fn begin_read(&self) -> StorageResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Verify the database answers a read transaction.
    pub fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCES)?;
        let _ = table.get(PATIENT_SEQUENCE)?;
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Reserve the next id of a sequence inside a write transaction.
///
/// Ids start at 1. A reservation made by an aborted transaction is rolled
/// back with it.
pub(crate) fn next_id(write_txn: &WriteTransaction, sequence: &str) -> StorageResult<u64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let current = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

/// Composite key for the prescriptions_by_owner index.
pub(crate) fn owner_key(owner_id: PatientId, prescription_id: PrescriptionId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&owner_id.to_be_bytes());
    key[8..].copy_from_slice(&prescription_id.to_be_bytes());
    key
}

/// Inclusive key bounds covering every index entry of one owner.
pub(crate) fn owner_range(owner_id: PatientId) -> ([u8; 16], [u8; 16]) {
    (owner_key(owner_id, 0), owner_key(owner_id, u64::MAX))
}

pub(crate) fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
pub(crate) fn temp_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("test.redb")).unwrap();
    (db, dir)
}
