// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_access,
    models::{
        CreatePrescriptionRequest, LoginRequest, LoginResponse, LoginUser, PaginationMeta,
        PatientSummary, Prescription, PrescriptionList, RefreshResponse, RegisterRequest,
        RegisterResponse, UpdatePrescriptionRequest,
    },
    state::AppState,
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod prescriptions;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/token/refresh", get(auth::refresh_token));

    let prescription_routes = Router::new()
        .route(
            "/api/v1/prescriptions",
            get(prescriptions::list_prescriptions).post(prescriptions::create_prescription),
        )
        .route(
            "/api/v1/prescriptions/{id}",
            get(prescriptions::get_prescription)
                .put(prescriptions::update_prescription)
                .patch(prescriptions::update_prescription)
                .delete(prescriptions::delete_prescription),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access,
        ));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(auth_routes)
        .merge(prescription_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Prescriptions API"),
    paths(
        auth::register,
        auth::login,
        auth::me,
        auth::refresh_token,
        prescriptions::create_prescription,
        prescriptions::list_prescriptions,
        prescriptions::get_prescription,
        prescriptions::update_prescription,
        prescriptions::delete_prescription,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            PatientSummary,
            LoginRequest,
            LoginResponse,
            LoginUser,
            RefreshResponse,
            Prescription,
            CreatePrescriptionRequest,
            UpdatePrescriptionRequest,
            PrescriptionList,
            PaginationMeta,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and tokens"),
        (name = "Prescriptions", description = "Prescriptions of the authenticated patient"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
