// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the database.
//!
//! Each repository borrows the [`Database`](super::Database) and owns the
//! transactions for its entity type.

pub mod patients;
pub mod prescriptions;

pub use patients::{NewPatient, PatientKey, PatientRepository, StoredPatient};
pub use prescriptions::{
    NewPrescription, PrescriptionChanges, PrescriptionRepository, StoredPrescription,
};
