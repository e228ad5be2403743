// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuing and verification (HS256).
//!
//! Tokens are stateless. A token is valid from issue until `exp`; there is no
//! revocation and no clock skew allowance.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, AuthenticatedPatient, Claims, TokenClass};
use crate::storage::PatientId;

/// Signing secret and token lifetimes.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies tokens with the secret it was built with.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a token of `class` for `patient_id`.
    pub fn issue(&self, patient_id: PatientId, class: TokenClass) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: patient_id.to_string(),
            token_class: class,
            iat: now.timestamp(),
            exp: (now + self.ttl(class)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))
    }

    pub fn issue_pair(&self, patient_id: PatientId) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(patient_id, TokenClass::Access)?,
            refresh: self.issue(patient_id, TokenClass::Refresh)?,
        })
    }

    /// Verify a token and require it to be of `class`.
    pub fn verify(
        &self,
        token: &str,
        class: TokenClass,
    ) -> Result<AuthenticatedPatient, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;
        let claims = token_data.claims;

        // The library accepts exp == now; a token is already dead at exp.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        if claims.token_class != class {
            return Err(AuthError::WrongTokenClass);
        }

        let patient_id = claims
            .sub
            .parse::<PatientId>()
            .map_err(|_| AuthError::MalformedToken)?;

        Ok(AuthenticatedPatient {
            patient_id,
            token_class: claims.token_class,
        })
    }
}

#[cfg(test)]
pub(crate) fn test_token_config() -> TokenConfig {
    TokenConfig {
        secret: "test-secret-key-12345".to_string(),
        access_ttl: Duration::minutes(15),
        refresh_ttl: Duration::days(30),
    }
}
