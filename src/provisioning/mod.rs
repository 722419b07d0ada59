// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Orchestration
//!
//! Turns a desired state into broker calls:
//!
//! ```text
//! ProvisionRequest ──validate──> Credentials, Scope, DesiredState
//!        ↓
//! IamTokenProvider ──token──> BrokerClient
//!        ↓
//! Provisioner (ProvisioningRun FSM + ProvisioningSession)
//!        ↓
//! RunReport | ProvisionFailure
//! ```
//!
//! # Target states
//!
//! - **present**: create unless an instance with the name exists
//! - **absent**: delete if it exists
//! - **latest** / **reloaded**: delete if it exists, wait until it is gone,
//!   then create
//!
//! Waits are bounded by [`PollPolicy`]; exceeding it fails the run with
//! `ProvisionError::Timeout`.

mod driver;
mod poll;
mod report;

pub use driver::Provisioner;
pub use poll::PollPolicy;
pub use report::{ProvisionFailure, RunReport};

use tracing::info;

use crate::auth::IamTokenProvider;
use crate::broker::BrokerClient;
use crate::config::{ProvisionRequest, ProvisionerSettings};

/// Validate a request, authenticate and run it against the regional broker
///
/// Configuration errors are reported before any network call.
pub async fn provision(
    request: ProvisionRequest,
    settings: &ProvisionerSettings,
) -> Result<RunReport, ProvisionFailure> {
    let (credentials, scope, desired) = request.into_parts()?;
    info!(
        "Provisioning '{}' ({}) in region {}",
        desired.name(),
        desired.target(),
        credentials.region
    );

    let mut tokens = IamTokenProvider::new(&credentials, settings)?;
    let token = tokens.token().await?;

    let broker = BrokerClient::new(credentials.region, scope, &token, settings)?;
    Provisioner::new(&broker, desired, settings.poll).run().await
}
