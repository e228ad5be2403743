// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::storage::Database;

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(tokens),
            passwords,
        }
    }
}

/// State backed by a throwaway database and the minimum bcrypt cost.
#[cfg(test)]
pub(crate) fn create_test_state() -> (AppState, tempfile::TempDir) {
    let (db, temp_dir) = crate::storage::database::temp_db();
    let tokens = TokenService::new(&crate::auth::tokens::test_token_config());
    let passwords = PasswordHasher::new(4).expect("bcrypt accepts cost 4");
    (AppState::new(db, tokens, passwords), temp_dir)
}
