// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Input validation for registration and prescriptions.
//!
//! Lengths are counted in characters, not bytes.

use std::sync::OnceLock;

use regex::Regex;

use crate::{auth::MAX_PASSWORD_BYTES, error::ApiError};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 80;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 70;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // local@domain.tld; no whitespace, one @, dotted domain with a 2+ letter TLD
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .expect("email regex is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN && email_regex().is_match(email)
}

/// Check registration fields. The first failing rule wins.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation("password", "Password is too short"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::validation("password", "Password is too long"));
    }

    let username_len = username.chars().count();
    if username_len < MIN_USERNAME_LEN {
        return Err(ApiError::validation("username", "Username is too short"));
    }
    if !username.chars().all(char::is_alphanumeric) {
        return Err(ApiError::validation(
            "username",
            "Username should be alphanumeric and should not have spaces",
        ));
    }
    if username_len > MAX_USERNAME_LEN {
        return Err(ApiError::validation("username", "Username is too long"));
    }

    if !is_valid_email(email) {
        return Err(ApiError::validation("email", "Email is not valid"));
    }

    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation("title", "Title is too long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ApiError>) -> Option<&'static str> {
        result.err().and_then(|e| e.field)
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration("alice1", "alice@example.com", "secret1").is_ok());
    }

    #[test]
    fn password_is_checked_first() {
        // Everything is wrong; the password rule reports first.
        let result = validate_registration("a b", "nope", "123");
        assert_eq!(field_of(result), Some("password"));
    }

    #[test]
    fn password_over_bcrypt_limit_is_rejected() {
        let longest = "p".repeat(MAX_PASSWORD_BYTES);
        assert!(validate_registration("alice1", "alice@example.com", &longest).is_ok());

        let too_long = format!("{longest}x");
        assert_eq!(
            field_of(validate_registration("alice1", "alice@example.com", &too_long)),
            Some("password")
        );

        // Multi-byte characters count by encoded length.
        let wide = "é".repeat(MAX_PASSWORD_BYTES / 2 + 1);
        assert_eq!(
            field_of(validate_registration("alice1", "alice@example.com", &wide)),
            Some("password")
        );
    }

    #[test]
    fn username_rules() {
        assert_eq!(
            field_of(validate_registration("ab", "a@example.com", "secret1")),
            Some("username")
        );
        assert_eq!(
            field_of(validate_registration("ali ce", "a@example.com", "secret1")),
            Some("username")
        );
        assert_eq!(
            field_of(validate_registration("alice_1", "a@example.com", "secret1")),
            Some("username")
        );
        let long = "a".repeat(MAX_USERNAME_LEN + 1);
        assert_eq!(
            field_of(validate_registration(&long, "a@example.com", "secret1")),
            Some("username")
        );
        let longest = "a".repeat(MAX_USERNAME_LEN);
        assert!(validate_registration(&longest, "a@example.com", "secret1").is_ok());
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a @example.com"));
        assert!(!is_valid_email("a@@example.com"));
        assert!(!is_valid_email(""));

        let local = "a".repeat(MAX_EMAIL_LEN);
        assert!(!is_valid_email(&format!("{local}@example.com")));
    }

    #[test]
    fn title_length() {
        assert!(validate_title(&"t".repeat(MAX_TITLE_LEN)).is_ok());
        let err = validate_title(&"t".repeat(MAX_TITLE_LEN + 1)).unwrap_err();
        assert_eq!(err.field, Some("title"));
    }
}
