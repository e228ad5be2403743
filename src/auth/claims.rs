// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated patient representation.

use serde::{Deserialize, Serialize};

use crate::storage::PatientId;

/// Which kind of token a JWT is. Carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims signed into every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (patient id as a decimal string)
    pub sub: String,
    #[serde(rename = "type")]
    pub token_class: TokenClass,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Identity established from a verified token.
///
/// This is what handlers receive after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPatient {
    pub patient_id: PatientId,
    pub token_class: TokenClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_is_serialized_lowercase_under_type() {
        let claims = Claims {
            sub: "7".to_string(),
            token_class: TokenClass::Refresh,
            iat: 1,
            exp: 2,
            jti: "abc".to_string(),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
        assert_eq!(json["sub"], "7");
    }

    #[test]
    fn unknown_class_fails_to_parse() {
        let parsed = serde_json::from_str::<TokenClass>(r#""admin""#);
        assert!(parsed.is_err());
    }
}
