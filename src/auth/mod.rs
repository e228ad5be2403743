// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password login with locally signed JWTs.
//!
//! ## Auth Flow
//!
//! 1. Patient registers; the password is stored as a bcrypt digest
//! 2. `POST /auth/login` verifies the password and returns an access token
//!    and a refresh token
//! 3. Clients send `Authorization: Bearer <access token>`
//! 4. `GET /auth/token/refresh` trades a refresh token for a new access token
//!
//! ## Security
//!
//! - Tokens are HS256 with a secret injected from configuration
//! - Every token failure yields the same 401 body
//! - Zero clock skew tolerance

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod tokens;

pub use claims::{AuthenticatedPatient, Claims, TokenClass};
pub use error::AuthError;
pub use extractor::{authorize, Auth, RefreshAuth};
pub use middleware::require_access;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use tokens::{TokenConfig, TokenPair, TokenService};
