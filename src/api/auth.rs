// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and token endpoints.
//!
//! Login never reveals whether the email exists: unknown accounts and wrong
//! passwords produce the same response after the same amount of bcrypt work.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::ApiJson;

use crate::{
    auth::{Auth, RefreshAuth, TokenClass},
    error::ApiError,
    models::{
        LoginRequest, LoginResponse, LoginUser, PatientSummary, RefreshResponse, RegisterRequest,
        RegisterResponse,
    },
    state::AppState,
    storage::{NewPatient, PatientKey, PatientRepository, StorageError, UniqueField},
    validation::validate_registration,
};

/// Register a new patient.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    tag = "Authentication",
    responses(
        (status = 201, description = "Patient created", body = RegisterResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email or username is taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_registration(&request.username, &request.email, &request.password)?;

    // Fail fast before paying for the hash; insert re-checks atomically.
    let repo = PatientRepository::new(&state.db);
    if repo.exists_by(PatientKey::Email(&request.email))? {
        return Err(StorageError::Conflict(UniqueField::Email).into());
    }
    if repo.exists_by(PatientKey::Username(&request.username))? {
        return Err(StorageError::Conflict(UniqueField::Username).into());
    }

    let password_hash = state.passwords.hash_blocking(request.password).await?;
    let patient = repo.insert(NewPatient {
        username: request.username,
        email: request.email,
        password_hash,
        fullname: request.fullname,
        phone: request.phone,
        address: request.address,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Patient created".to_string(),
            user: PatientSummary::from(&patient),
        }),
    ))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    tag = "Authentication",
    responses(
        (status = 200, description = "Tokens issued", body = LoginResponse),
        (status = 401, description = "Wrong credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let repo = PatientRepository::new(&state.db);
    let patient = repo.find_by_email(&request.email)?;

    let digest = patient.as_ref().map(|p| p.password_hash.clone());
    let password_ok = state
        .passwords
        .verify_blocking(digest, request.password)
        .await?;

    let patient = match patient {
        Some(patient) if password_ok => patient,
        _ => {
            tracing::info!("Login rejected");
            return Err(ApiError::wrong_credentials());
        }
    };

    let tokens = state.tokens.issue_pair(patient.id)?;
    tracing::info!(patient_id = patient.id, "Patient logged in");

    Ok(Json(LoginResponse {
        user: LoginUser {
            refresh: tokens.refresh,
            access: tokens.access,
            username: patient.username,
            email: patient.email,
        },
    }))
}

/// Get the authenticated patient.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current patient", body = PatientSummary),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Patient no longer exists")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> Result<Json<PatientSummary>, ApiError> {
    let repo = PatientRepository::new(&state.db);
    let patient = repo
        .find_by_id(caller.patient_id)?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(PatientSummary::from(&patient)))
}

/// Trade a refresh token for a new access token.
///
/// The refresh token itself is not rotated.
#[utoipa::path(
    get,
    path = "/api/v1/auth/token/refresh",
    tag = "Authentication",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Missing or invalid refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    RefreshAuth(caller): RefreshAuth,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access = state.tokens.issue(caller.patient_id, TokenClass::Access)?;
    tracing::debug!(patient_id = caller.patient_id, "Access token refreshed");
    Ok(Json(RefreshResponse { access }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;

    fn registration(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn register_success() {
        let (state, _temp_dir) = create_test_state();

        let (status, Json(body)) =
            register(State(state.clone()), ApiJson(registration("alice1", "alice@example.com")))
                .await
                .expect("registration succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Patient created");
        assert_eq!(body.user.username, "alice1");

        let stored = PatientRepository::new(&state.db)
            .find_by_email("alice@example.com")
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(state.passwords.verify(&stored.password_hash, "secret1"));
    }

    #[tokio::test]
    async fn register_reports_email_before_username() {
        let (state, _temp_dir) = create_test_state();
        register(State(state.clone()), ApiJson(registration("alice1", "alice@example.com")))
            .await
            .unwrap();

        let both_taken = register(
            State(state.clone()),
            ApiJson(registration("alice1", "alice@example.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(both_taken.status, StatusCode::CONFLICT);
        assert_eq!(both_taken.message, "Email is taken");

        let username_taken = register(
            State(state.clone()),
            ApiJson(registration("alice1", "other@example.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(username_taken.status, StatusCode::CONFLICT);
        assert_eq!(username_taken.message, "Username is taken");
    }

    #[tokio::test]
    async fn login_issues_both_tokens() {
        let (state, _temp_dir) = create_test_state();
        register(State(state.clone()), ApiJson(registration("alice1", "alice@example.com")))
            .await
            .unwrap();

        let Json(body) = login(
            State(state.clone()),
            ApiJson(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "secret1".to_string(),
            }),
        )
        .await
        .expect("login succeeds");

        assert_eq!(body.user.username, "alice1");
        let access = state.tokens.verify(&body.user.access, TokenClass::Access).unwrap();
        let refresh = state
            .tokens
            .verify(&body.user.refresh, TokenClass::Refresh)
            .unwrap();
        assert_eq!(access.patient_id, refresh.patient_id);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (state, _temp_dir) = create_test_state();
        register(State(state.clone()), ApiJson(registration("alice1", "alice@example.com")))
            .await
            .unwrap();

        let wrong_password = login(
            State(state.clone()),
            ApiJson(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "wrong-password".to_string(),
            }),
        )
        .await
        .unwrap_err();
        let unknown_email = login(
            State(state.clone()),
            ApiJson(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "secret1".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status, unknown_email.status);
        assert_eq!(wrong_password.message, unknown_email.message);
    }

    #[tokio::test]
    async fn me_for_deleted_subject_is_not_found() {
        let (state, _temp_dir) = create_test_state();
        let token = state.tokens.issue(404, TokenClass::Access).unwrap();
        let caller = state.tokens.verify(&token, TokenClass::Access).unwrap();

        let err = me(State(state), Auth(caller)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn refresh_issues_access_token_for_same_subject() {
        let (state, _temp_dir) = create_test_state();
        let refresh = state.tokens.issue(3, TokenClass::Refresh).unwrap();
        let caller = state.tokens.verify(&refresh, TokenClass::Refresh).unwrap();

        let Json(body) = refresh_token(State(state.clone()), RefreshAuth(caller))
            .await
            .unwrap();
        let access = state.tokens.verify(&body.access, TokenClass::Access).unwrap();
        assert_eq!(access.patient_id, 3);
    }
}
