// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password digests (bcrypt).
//!
//! bcrypt is deliberately slow, so the async entry points move the work to
//! the blocking thread pool.

use std::sync::Arc;

use super::AuthError;

/// bcrypt only reads this many bytes of input; anything past it is ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Digest checked against when the account does not exist.
    dummy_digest: Arc<str>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy = bcrypt::hash("not-a-real-password", cost)
            .map_err(|e| AuthError::InternalError(format!("bcrypt setup failed: {e}")))?;
        Ok(Self {
            cost,
            dummy_digest: Arc::from(dummy),
        })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are refused rather than
    /// truncated.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::InternalError(
                "password exceeds bcrypt input limit".to_string(),
            ));
        }
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::InternalError(format!("bcrypt hash failed: {e}")))
    }

    /// Check a candidate password against a stored digest.
    ///
    /// A malformed digest never matches, and neither does a candidate longer
    /// than [`MAX_PASSWORD_BYTES`].
    pub fn verify(&self, digest: &str, candidate: &str) -> bool {
        if candidate.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(candidate, digest) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password digest could not be parsed");
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::InternalError(format!("hash task failed: {e}")))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    ///
    /// With no digest the candidate is checked against a dummy digest, so an
    /// unknown account costs as much as a wrong password. The result is then
    /// always `false`.
    pub async fn verify_blocking(
        &self,
        digest: Option<String>,
        candidate: String,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&digest, &candidate),
            None => {
                let _ = hasher.verify(&hasher.dummy_digest, &candidate);
                false
            }
        })
        .await
        .map_err(|e| AuthError::InternalError(format!("verify task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost bcrypt accepts; keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        let digest = hasher.hash("secret1").unwrap();

        assert!(hasher.verify(&digest, "secret1"));
        assert!(!hasher.verify(&digest, "secret2"));
    }

    #[test]
    fn salts_differ_per_hash() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        let a = hasher.hash("secret1").unwrap();
        let b = hasher.hash("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_never_matches() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        assert!(!hasher.verify("not-a-bcrypt-digest", "secret1"));
    }

    #[test]
    fn long_passwords_are_not_truncated() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let p1 = format!("{prefix}x");
        let p2 = format!("{prefix}y");

        assert!(hasher.hash(&p1).is_err());

        // A stored 72-byte password must not match a longer candidate with
        // the same prefix.
        let digest = hasher.hash(&prefix).unwrap();
        assert!(hasher.verify(&digest, &prefix));
        assert!(!hasher.verify(&digest, &p1));
        assert!(!hasher.verify(&digest, &p2));
    }

    #[test]
    fn invalid_cost_is_rejected() {
        assert!(PasswordHasher::new(2).is_err());
    }

    #[tokio::test]
    async fn blocking_variants() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        let digest = hasher.hash_blocking("secret1".to_string()).await.unwrap();

        assert!(hasher
            .verify_blocking(Some(digest.clone()), "secret1".to_string())
            .await
            .unwrap());
        assert!(!hasher
            .verify_blocking(Some(digest), "wrong".to_string())
            .await
            .unwrap());
        assert!(!hasher
            .verify_blocking(None, "not-a-real-password".to_string())
            .await
            .unwrap());
    }
}
