// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-Run Provisioning Session
//!
//! A session binds a broker to one instance name for the duration of a run
//! and remembers what it has learned along the way: the instance ID and the
//! last non-empty resource listing. The cache is advisory; every mutation is
//! still confirmed by the broker's response, and nothing outlives the run.

use tracing::{debug, info, warn};

use super::ServiceBroker;
use crate::domain::{
    InstanceDetails, InstanceType, ResourceListing, ResourceRecord, ServiceInstance,
    ServiceInstanceId, ServiceInstanceSpec,
};
use crate::errors::{ProvisionError, ProvisionResult};

/// Instance-scoped view of a broker for a single run
pub struct ProvisioningSession<'a, B: ServiceBroker + ?Sized> {
    broker: &'a B,
    name: String,
    instance_id: Option<ServiceInstanceId>,
    resources: Option<Vec<ResourceRecord>>,
}

impl<'a, B: ServiceBroker + ?Sized> ProvisioningSession<'a, B> {
    pub fn new(broker: &'a B, name: impl Into<String>) -> Self {
        Self {
            broker,
            name: name.into(),
            instance_id: None,
            resources: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cached instance ID, if known
    pub fn instance_id(&self) -> Option<&ServiceInstanceId> {
        self.instance_id.as_ref()
    }

    /// Probe that the organization, space and token are usable
    ///
    /// Performs a listing and discards it.
    pub async fn valid_connection(&self) -> ProvisionResult<()> {
        match self.broker.list_instances().await {
            Ok(instances) => {
                debug!("Connection valid, {} instances in space", instances.len());
                Ok(())
            }
            Err(ProvisionError::BrokerOperation { body, .. }) => {
                Err(ProvisionError::Connectivity(body))
            }
            Err(ProvisionError::Http(message) | ProvisionError::Deserialization(message)) => {
                Err(ProvisionError::Connectivity(message))
            }
            Err(e) => Err(e),
        }
    }

    /// First listed instance carrying this session's name and an ID
    async fn find_named(&self) -> ProvisionResult<Option<(ServiceInstanceId, ServiceInstance)>> {
        let entries = self.broker.list_instances().await?;
        Ok(entries
            .into_iter()
            .map(|entry| entry.service_instance)
            .find_map(|instance| {
                let id = instance.id_if_named(&self.name)?.clone();
                Some((id, instance))
            }))
    }

    /// Whether an instance with this session's name is listed
    ///
    /// Entries without a `Name` or an ID never match. The ID of a match is cached if
    /// none is known yet.
    pub async fn instance_exists(&mut self) -> ProvisionResult<bool> {
        match self.find_named().await? {
            Some((id, _)) => {
                if self.instance_id.is_none() {
                    debug!("Found instance '{}' with ID {}", self.name, id);
                    self.instance_id = Some(id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cached ID, or look it up by name
    pub async fn resolve_instance_id(&mut self) -> ProvisionResult<ServiceInstanceId> {
        if let Some(id) = &self.instance_id {
            return Ok(id.clone());
        }
        let (id, _) = self
            .find_named()
            .await?
            .ok_or_else(|| ProvisionError::InstanceNotFound(self.name.clone()))?;
        self.instance_id = Some(id.clone());
        Ok(id)
    }

    /// Submit the creation request and remember the new instance ID
    pub async fn create_instance(
        &mut self,
        spec: &ServiceInstanceSpec,
    ) -> ProvisionResult<ServiceInstanceId> {
        let id = self.broker.create_instance(&spec.to_payload()).await?;
        info!("Instance '{}' requested as {}", spec.name, id);
        self.instance_id = Some(id.clone());
        self.resources = None;
        Ok(id)
    }

    /// Readiness: the instance lists at least one resource record
    ///
    /// Broker errors and 404s count as not ready.
    pub async fn instance_ready(&mut self) -> ProvisionResult<bool> {
        let id = self.resolve_instance_id().await?;
        match self.broker.resources(&id).await {
            Ok(ResourceListing::Available(records)) if !records.is_empty() => {
                self.resources = Some(records);
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(ProvisionError::BrokerOperation { status, body, .. }) => {
                warn!(
                    "Error retrieving resources of {}, server returned status code {}: {}",
                    id, status, body
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the instance, resolving its ID first if needed
    pub async fn delete_instance(&mut self) -> ProvisionResult<()> {
        let id = self.resolve_instance_id().await?;
        self.broker.delete_instance(&id).await?;
        info!("Instance '{}' ({}) deleted", self.name, id);
        self.instance_id = None;
        self.resources = None;
        Ok(())
    }

    /// Resource records, served from the cache when already populated
    ///
    /// Returns [`ResourceListing::InProgress`] while the broker answers 404.
    pub async fn resources_list(&mut self) -> ProvisionResult<ResourceListing> {
        if let Some(records) = &self.resources {
            return Ok(ResourceListing::Available(records.clone()));
        }
        let id = self.resolve_instance_id().await?;
        let listing = self.broker.resources(&id).await?;
        if let ResourceListing::Available(records) = &listing {
            if !records.is_empty() {
                self.resources = Some(records.clone());
            }
        }
        Ok(listing)
    }

    /// Admin access details of a base server instance
    ///
    /// Only `WASBase` instances are supported; other service types are
    /// rejected.
    pub async fn instance_details(&mut self) -> ProvisionResult<InstanceDetails> {
        let (id, instance) = self
            .find_named()
            .await?
            .ok_or_else(|| ProvisionError::InstanceNotFound(self.name.clone()))?;

        let service_type = instance.service_type.as_deref().unwrap_or_default();
        if service_type != InstanceType::BaseServer.as_str() {
            return Err(ProvisionError::UnsupportedServiceType(service_type.to_string()));
        }

        if self.instance_id.as_ref() != Some(&id) {
            self.instance_id = Some(id.clone());
            self.resources = None;
        }

        let records = match self.resources_list().await? {
            ResourceListing::Available(records) => records,
            ResourceListing::InProgress => Vec::new(),
        };
        Ok(InstanceDetails::from_resources(id, records))
    }

    /// VPN configuration document of the instance
    pub async fn vpn_config(&mut self) -> ProvisionResult<serde_json::Value> {
        let id = self.resolve_instance_id().await?;
        self.broker.vpn_config(&id).await
    }

    /// One resource record of the instance
    pub async fn resource_detail(&mut self, resource_id: &str) -> ProvisionResult<serde_json::Value> {
        let id = self.resolve_instance_id().await?;
        self.broker.resource_detail(&id, resource_id).await
    }
}
