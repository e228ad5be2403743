// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::error::{INTERNAL_MESSAGE, UNAUTHORIZED_MESSAGE};
use crate::auth::AuthError;
use crate::storage::StorageError;

pub const NOT_FOUND_MESSAGE: &str = "Item not found";
pub const WRONG_CREDENTIALS_MESSAGE: &str = "Wrong credentials";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Request field the error refers to, if any.
    pub field: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 pointing at the offending request field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::bad_request(message).with_field(field)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
    }

    /// Same response for an unknown email and a wrong password.
    pub fn wrong_credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, WRONG_CREDENTIALS_MESSAGE)
    }

    /// 500 with a generic body. `detail` is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => {
                tracing::debug!(%what, "Lookup missed");
                Self::not_found()
            }
            StorageError::Conflict(field) => {
                Self::conflict(field.to_string()).with_field(field.field())
            }
            other => Self::internal(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InternalError(detail) => Self::internal(detail),
            other => {
                tracing::debug!(reason = other.error_code(), "Request rejected: {other}");
                Self::unauthorized()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "JSON body rejected");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected Content-Type: application/json",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "Request body has missing or mistyped fields",
            _ => "Invalid request body",
        };
        Self::bad_request(message)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Query string rejected");
        Self::bad_request("Invalid query parameters")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Path parameters rejected");
        Self::bad_request("Invalid path parameter")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            field: self.field,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UniqueField;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "Item not found");

        let bad = ApiError::validation("username", "too short");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.field, Some("username"));

        let creds = ApiError::wrong_credentials();
        assert_eq!(creds.status, StatusCode::UNAUTHORIZED);
        assert_eq!(creds.message, "Wrong credentials");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn validation_body_names_the_field() {
        let response = ApiError::validation("email", "Email is not valid").into_response();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"Email is not valid","field":"email"}"#);
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        let nf: ApiError = StorageError::NotFound("Prescription 3".into()).into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, NOT_FOUND_MESSAGE);

        let taken: ApiError = StorageError::Conflict(UniqueField::Email).into();
        assert_eq!(taken.status, StatusCode::CONFLICT);
        assert_eq!(taken.message, "Email is taken");

        let io: ApiError = StorageError::Io(std::io::Error::other("disk on fire")).into();
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn auth_errors_collapse_to_401() {
        let expired: ApiError = AuthError::TokenExpired.into();
        let class: ApiError = AuthError::WrongTokenClass.into();
        assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
        assert_eq!(expired.message, class.message);

        let internal: ApiError = AuthError::InternalError("bcrypt".into()).into();
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
