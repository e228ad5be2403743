// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use prescriptions_server::{config::Config, server, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet; the log format itself comes from config.
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(config.log_format);
    tracing::debug!(?config, "Configuration loaded");

    if let Err(e) = server::run(config).await {
        tracing::error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
