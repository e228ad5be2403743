// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Gates a whole router subtree on a valid access token. The verified
//! identity is stored in request extensions, where the `Auth` extractor
//! picks it up without verifying the token a second time.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/", get(list))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_access));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{authorize, TokenClass};
use crate::state::AppState;

/// Reject the request unless it carries a valid access token.
pub async fn require_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(request.headers(), &state.tokens, TokenClass::Access) {
        Ok(patient) => {
            request.extensions_mut().insert(patient);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Auth;
    use crate::state::create_test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(Auth(patient): Auth) -> String {
        patient.patient_id.to_string()
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_access))
            .with_state(state)
    }

    #[tokio::test]
    async fn request_without_token_never_reaches_handler() {
        let (state, _temp_dir) = create_test_state();
        let response = app(state)
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn identity_is_forwarded_to_handler() {
        let (state, _temp_dir) = create_test_state();
        let token = state.tokens.issue(11, TokenClass::Access).unwrap();

        let response = app(state)
            .oneshot(
                HttpRequest::get("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"11");
    }

    #[tokio::test]
    async fn refresh_token_is_refused() {
        let (state, _temp_dir) = create_test_state();
        let token = state.tokens.issue(11, TokenClass::Refresh).unwrap();

        let response = app(state)
            .oneshot(
                HttpRequest::get("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
