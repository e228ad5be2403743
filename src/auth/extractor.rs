// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated patients.
//!
//! Use `Auth` in handlers that need an access token and `RefreshAuth` in the
//! one handler that accepts a refresh token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(patient): Auth) -> impl IntoResponse {
//!     // patient is AuthenticatedPatient
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedPatient, TokenClass, TokenService};
use crate::state::AppState;

/// Read the bearer token from `headers` and verify it as `class`.
pub fn authorize(
    headers: &HeaderMap,
    tokens: &TokenService,
    class: TokenClass,
) -> Result<AuthenticatedPatient, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;

    tokens.verify(token, class)
}

/// Extractor requiring an access token.
pub struct Auth(pub AuthenticatedPatient);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // First check if middleware already verified the token
        if let Some(patient) = parts.extensions.get::<AuthenticatedPatient>() {
            if patient.token_class == TokenClass::Access {
                return Ok(Auth(patient.clone()));
            }
        }

        authorize(&parts.headers, &state.tokens, TokenClass::Access).map(Auth)
    }
}

/// Extractor requiring a refresh token.
pub struct RefreshAuth(pub AuthenticatedPatient);

impl FromRequestParts<AppState> for RefreshAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.tokens, TokenClass::Refresh).map(RefreshAuth)
    }
}
