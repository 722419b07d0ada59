// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Broker Access
//!
//! The broker is the only source of truth about service instances. This
//! module splits access to it in two layers:
//!
//! ```text
//! Provisioner
//!     ↓
//! ProvisioningSession  (per-run instance ID and resource cache)
//!     ↓
//! ServiceBroker        (stateless REST calls, one at a time)
//!     ↓
//! BrokerClient         (reqwest against the regional broker)
//! ```
//!
//! [`ServiceBroker`] is the seam: the HTTP client implements it for real
//! runs, tests substitute an in-memory broker.

pub mod client;
pub mod session;

use async_trait::async_trait;

use crate::domain::{CreateInstancePayload, ResourceListing, ServiceInstanceEntry, ServiceInstanceId};
use crate::errors::ProvisionResult;

pub use client::BrokerClient;
pub use session::ProvisioningSession;

/// REST surface of the broker, scoped to one organization/space
///
/// Non-success statuses surface as `ProvisionError::BrokerOperation`
/// carrying the raw response body, except where noted.
#[async_trait]
pub trait ServiceBroker: Send + Sync {
    /// List every service instance in the space
    async fn list_instances(&self) -> ProvisionResult<Vec<ServiceInstanceEntry>>;

    /// Request a new instance; returns the broker-assigned ID
    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> ProvisionResult<ServiceInstanceId>;

    /// Delete an instance; only 204 counts as success
    async fn delete_instance(&self, id: &ServiceInstanceId) -> ProvisionResult<()>;

    /// Resource records of an instance
    ///
    /// A 404 is not an error: it yields [`ResourceListing::InProgress`].
    async fn resources(&self, id: &ServiceInstanceId) -> ProvisionResult<ResourceListing>;

    /// A single resource record, as raw JSON
    async fn resource_detail(
        &self,
        id: &ServiceInstanceId,
        resource_id: &str,
    ) -> ProvisionResult<serde_json::Value>;

    /// The `VpnConfig` document of an instance
    async fn vpn_config(&self, id: &ServiceInstanceId) -> ProvisionResult<serde_json::Value>;
}
