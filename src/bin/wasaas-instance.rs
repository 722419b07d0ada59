// Copyright (c) 2025 - Cowboy AI, Inc.
//! WebSphere-as-a-Service instance task
//!
//! Reads a desired-state document (JSON) from the file named by the first
//! argument, or from stdin when no argument is given, provisions it, and
//! prints the result as JSON on stdout. Exit status is 0 on success and 1 on
//! failure.
//!
//! Run with: cargo run --bin wasaas-instance -- request.json
//!
//! Settings come from the environment:
//! - WASAAS_POLL_INTERVAL_SECS (default 10)
//! - WASAAS_MAX_WAIT_SECS (default 7200)
//! - WASAAS_HTTP_TIMEOUT_SECS (default 30)
//! - WASAAS_PROVIDER_DOMAIN (default bluemix.net)
//! - WASAAS_TOKEN_URL / WASAAS_BROKER_URL (endpoint overrides)

use anyhow::{Context, Result};
use std::io::Read;
use std::process::ExitCode;
use tracing::{error, info};

use wasaas_provisioner::{provision, ProvisionRequest, ProvisionerSettings};

fn read_request() -> Result<ProvisionRequest> {
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read request file {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Request is not a valid desired-state document")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let request = read_request()?;
    let settings = ProvisionerSettings::from_env().context("Invalid WASAAS_* settings")?;

    match provision(request, &settings).await {
        Ok(report) => {
            info!("Run {} succeeded (changed: {})", report.run_id, report.changed);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            error!("Run {} failed: {}", failure.run_id, failure.error);
            println!("{}", serde_json::to_string_pretty(&failure.to_json())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
