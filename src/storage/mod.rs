// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Durable storage for patients and prescriptions, backed by an embedded
//! redb database (pure Rust, ACID, single writer).
//!
//! ## Table Layout
//!
//! ```text
//! patients                patient_id            -> JSON StoredPatient
//! patient_usernames       username              -> patient_id   (unique)
//! patient_emails          email                 -> patient_id   (unique)
//! patient_digests         password digest       -> patient_id   (unique)
//! prescriptions           prescription_id       -> JSON StoredPrescription
//! prescriptions_by_owner  owner_be|id_be        -> prescription_id
//! sequences               sequence name         -> last issued id
//! ```
//!
//! Uniqueness is checked and written inside the same write transaction.
//! redb serializes writers, so check-then-insert cannot race.

pub mod database;
pub mod ownership;
pub mod pagination;
pub mod repository;

pub use database::Database;
pub use ownership::{OwnedResource, OwnershipCheck};
pub use pagination::{Page, PageRequest};
pub use repository::{
    NewPatient, NewPrescription, PatientKey, PatientRepository, PrescriptionChanges,
    PrescriptionRepository, StoredPatient, StoredPrescription,
};

/// Identifier of a patient (the token subject).
pub type PatientId = u64;

/// Identifier of a prescription.
pub type PrescriptionId = u64;

/// Column protected by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    PasswordDigest,
}

impl UniqueField {
    /// Request field name this constraint maps to.
    pub fn field(&self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
            UniqueField::PasswordDigest => "password",
        }
    }
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Username => write!(f, "Username is taken"),
            UniqueField::Email => write!(f, "Email is taken"),
            UniqueField::PasswordDigest => write!(f, "Password cannot be used"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(UniqueField),
}

pub type StorageResult<T> = Result<T, StorageError>;
