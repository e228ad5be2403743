// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prescriptions API - patient and prescription service
//!
//! Patients register with a password, log in for a pair of JWTs, and manage
//! prescriptions that only they can see.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password digests, token issuing, request authorization
//! - `storage` - Embedded redb database and repositories
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod validation;
