// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for the OpenAPI document.
//!
//! Request bodies default missing fields to empty, so an absent `title` is
//! the same as `""`.
//!
//! ## Model Categories
//!
//! - **Auth**: registration, login, token refresh
//! - **Prescriptions**: create, update, paginated listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::{Page, PrescriptionId, StoredPatient, StoredPrescription};

// =============================================================================
// Auth Models
// =============================================================================

/// Request to register a new patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    /// 3 to 80 alphanumeric characters.
    #[schema(example = "alice1")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// At least 6 characters.
    #[schema(example = "secret1")]
    pub password: String,
    pub fullname: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Public view of a patient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PatientSummary {
    pub username: String,
    pub email: String,
}

impl From<&StoredPatient> for PatientSummary {
    fn from(patient: &StoredPatient) -> Self {
        Self {
            username: patient.username.clone(),
            email: patient.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "Patient created")]
    pub message: String,
    pub user: PatientSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

/// Patient and freshly issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub refresh: String,
    pub access: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: LoginUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// New access token.
    pub access: String,
}

// =============================================================================
// Prescription Models
// =============================================================================

/// A prescription as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Prescription {
    pub id: PrescriptionId,
    pub title: String,
    pub body: String,
    pub expedition_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredPrescription> for Prescription {
    fn from(stored: StoredPrescription) -> Self {
        Self {
            id: stored.id,
            title: stored.title,
            body: stored.body,
            expedition_date: stored.expedition_date,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePrescriptionRequest {
    /// At most 70 characters.
    #[schema(example = "Ibuprofen 400mg")]
    pub title: String,
    #[schema(example = "One tablet every 8 hours after meals")]
    pub body: String,
}

/// Partial update; omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePrescriptionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1 (default 1).
    pub page: Option<i64>,
    /// Items per page (default 5).
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u64,
    pub pages: u64,
    pub total_count: u64,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> From<&Page<T>> for PaginationMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page(),
            pages: page.pages(),
            total_count: page.total,
            prev_page: page.prev_page(),
            next_page: page.next_page(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionList {
    pub data: Vec<Prescription>,
    pub meta: PaginationMeta,
}

impl From<Page<StoredPrescription>> for PrescriptionList {
    fn from(page: Page<StoredPrescription>) -> Self {
        let meta = PaginationMeta::from(&page);
        Self {
            data: page.items.into_iter().map(Prescription::from).collect(),
            meta,
        }
    }
}
