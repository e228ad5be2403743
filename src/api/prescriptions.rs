// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prescription API endpoints.
//!
//! All operations require an access token and are scoped to the caller.
//! Another patient's prescription answers exactly like a missing one.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        CreatePrescriptionRequest, PaginationQuery, Prescription, PrescriptionList,
        UpdatePrescriptionRequest,
    },
    state::AppState,
    storage::{
        pagination::{DEFAULT_PAGE, DEFAULT_PER_PAGE},
        NewPrescription, PageRequest, PrescriptionChanges, PrescriptionId,
        PrescriptionRepository,
    },
    validation::validate_title,
};

fn page_request(query: PaginationQuery) -> Result<PageRequest, ApiError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE as i64);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE as i64);

    if page < 1 {
        return Err(ApiError::validation("page", "page must be a positive integer"));
    }
    if per_page < 1 {
        return Err(ApiError::validation(
            "per_page",
            "per_page must be a positive integer",
        ));
    }
    PageRequest::new(page as u64, per_page as u64)
        .ok_or_else(|| ApiError::bad_request("Invalid pagination"))
}

#[utoipa::path(
    post,
    path = "/api/v1/prescriptions",
    request_body = CreatePrescriptionRequest,
    tag = "Prescriptions",
    security(("bearer" = [])),
    responses(
        (status = 201, body = Prescription),
        (status = 400, description = "Title is too long"),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn create_prescription(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ApiJson(request): ApiJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Prescription>), ApiError> {
    validate_title(&request.title)?;

    let repo = PrescriptionRepository::new(&state.db);
    let prescription = repo.insert(
        caller.patient_id,
        NewPrescription {
            title: request.title,
            body: request.body,
        },
    )?;

    Ok((StatusCode::CREATED, Json(prescription.into())))
}

/// List the caller's prescriptions, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    params(PaginationQuery),
    tag = "Prescriptions",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PrescriptionList),
        (status = 400, description = "Non-positive page or per_page"),
        (status = 404, description = "Page is past the last one")
    )
)]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ApiQuery(query): ApiQuery<PaginationQuery>,
) -> Result<Json<PrescriptionList>, ApiError> {
    let request = page_request(query)?;

    let repo = PrescriptionRepository::new(&state.db);
    let page = repo.find_by_owner(caller.patient_id, request)?;

    // Page 1 is always answerable, even with no rows.
    if page.items.is_empty() && page.page() > 1 {
        return Err(ApiError::not_found());
    }

    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{id}",
    params(("id" = u64, Path, description = "Prescription id")),
    tag = "Prescriptions",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Prescription),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_prescription(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ApiPath(id): ApiPath<PrescriptionId>,
) -> Result<Json<Prescription>, ApiError> {
    let repo = PrescriptionRepository::new(&state.db);
    let prescription = repo.find_by_id(caller.patient_id, id)?;
    Ok(Json(prescription.into()))
}

/// Update title and/or body. PUT and PATCH behave the same.
#[utoipa::path(
    method(put, patch),
    path = "/api/v1/prescriptions/{id}",
    params(("id" = u64, Path, description = "Prescription id")),
    request_body = UpdatePrescriptionRequest,
    tag = "Prescriptions",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Prescription),
        (status = 400, description = "Title is too long"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_prescription(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ApiPath(id): ApiPath<PrescriptionId>,
    ApiJson(request): ApiJson<UpdatePrescriptionRequest>,
) -> Result<Json<Prescription>, ApiError> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }

    let repo = PrescriptionRepository::new(&state.db);
    let prescription = repo.update(
        caller.patient_id,
        id,
        PrescriptionChanges {
            title: request.title,
            body: request.body,
        },
    )?;

    Ok(Json(prescription.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/prescriptions/{id}",
    params(("id" = u64, Path, description = "Prescription id")),
    tag = "Prescriptions",
    security(("bearer" = [])),
    responses(
        (status = 204),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_prescription(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ApiPath(id): ApiPath<PrescriptionId>,
) -> Result<StatusCode, ApiError> {
    let repo = PrescriptionRepository::new(&state.db);
    repo.delete(caller.patient_id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
