// Copyright (c) 2025 - Cowboy AI, Inc.
//! Broker REST Client
//!
//! Wraps the regional broker API:
//!
//! ```text
//! GET    /organizations/{org}/spaces/{space}/serviceinstances
//! POST   /organizations/{org}/spaces/{space}/serviceinstances
//! DELETE /organizations/{org}/spaces/{space}/serviceinstances/{sid}
//! GET    /organizations/{org}/spaces/{space}/serviceinstances/{sid}/resources
//! GET    /organizations/{org}/spaces/{space}/serviceinstances/{sid}/resources/{rid}
//! GET    /organizations/{org}/spaces/{space}/serviceinstances/{sid}/vpnconfig
//! ```
//!
//! Every request carries the bearer token and `Accept: application/json`.
//! Failure bodies are passed through untouched; they are not assumed to be JSON.

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::ServiceBroker;
use crate::auth::BearerToken;
use crate::config::{ProvisionerSettings, Scope};
use crate::domain::{
    CreateInstancePayload, Region, ResourceListing, ResourceRecord, ServiceInstanceEntry,
    ServiceInstanceId,
};
use crate::errors::{ProvisionError, ProvisionResult};

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(rename = "ServiceInstance")]
    service_instance: CreatedInstance,
}

#[derive(Debug, Deserialize)]
struct CreatedInstance {
    #[serde(rename = "ServiceInstanceID")]
    id: ServiceInstanceId,
}

#[derive(Debug, Deserialize)]
struct VpnConfigResponse {
    #[serde(rename = "VpnConfig")]
    vpn_config: serde_json::Value,
}

/// HTTP client for one organization/space on a regional broker
pub struct BrokerClient {
    client: Client,
    base_url: String,
    scope: Scope,
}

impl BrokerClient {
    /// Create a client for `region` using the configured endpoints
    pub fn new(
        region: Region,
        scope: Scope,
        token: &BearerToken,
        settings: &ProvisionerSettings,
    ) -> ProvisionResult<Self> {
        Self::with_base_url(
            settings.broker_url(region),
            scope,
            token,
            settings.http_timeout,
        )
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(
        base_url: impl Into<String>,
        scope: Scope,
        token: &BearerToken,
        timeout: Duration,
    ) -> ProvisionResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Using broker at {}", base_url);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                let mut authorization: header::HeaderValue =
                    token.authorization().parse().map_err(|e| {
                        ProvisionError::Configuration(format!("Invalid bearer token: {}", e))
                    })?;
                authorization.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, authorization);
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| {
                ProvisionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            scope,
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    fn instances_url(&self, scope: &Scope) -> String {
        format!(
            "{}/organizations/{}/spaces/{}/serviceinstances",
            self.base_url,
            urlencoding::encode(&scope.org),
            urlencoding::encode(&scope.space)
        )
    }

    fn instance_url(&self, id: &ServiceInstanceId) -> String {
        format!(
            "{}/{}",
            self.instances_url(&self.scope),
            urlencoding::encode(id.as_str())
        )
    }

    /// List the instances of an arbitrary organization/space
    pub async fn list_instances_in(
        &self,
        scope: &Scope,
    ) -> ProvisionResult<Vec<ServiceInstanceEntry>> {
        let url = self.instances_url(scope);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(failure("list instances", response).await);
        }
        Ok(response.json().await?)
    }
}

/// Turn an unexpected response into a broker error carrying the raw body
async fn failure(operation: &'static str, response: Response) -> ProvisionError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(
        "Broker call '{}' failed, server returned status code: {}",
        operation, status
    );
    debug!("Broker response body: {}", body);
    ProvisionError::BrokerOperation {
        operation,
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ServiceBroker for BrokerClient {
    async fn list_instances(&self) -> ProvisionResult<Vec<ServiceInstanceEntry>> {
        self.list_instances_in(&self.scope).await
    }

    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> ProvisionResult<ServiceInstanceId> {
        let url = self.instances_url(&self.scope);
        info!("Requesting {} instance '{}'", payload.instance_type, payload.name);

        let response = self.client.post(&url).json(payload).send().await?;
        if response.status() != StatusCode::OK {
            return Err(failure("create instance", response).await);
        }

        let created: CreateResponse = response.json().await?;
        debug!("Broker assigned instance ID {}", created.service_instance.id);
        Ok(created.service_instance.id)
    }

    async fn delete_instance(&self, id: &ServiceInstanceId) -> ProvisionResult<()> {
        let url = self.instance_url(id);
        info!("Deleting instance {}", id);

        let response = self.client.delete(&url).send().await?;
        if response.status() != StatusCode::NO_CONTENT {
            return Err(failure("delete instance", response).await);
        }
        Ok(())
    }

    async fn resources(&self, id: &ServiceInstanceId) -> ProvisionResult<ResourceListing> {
        let url = format!("{}/resources", self.instance_url(id));
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let records: Vec<ResourceRecord> = response.json().await?;
                Ok(ResourceListing::Available(records))
            }
            StatusCode::NOT_FOUND => {
                debug!("Resources of {} not available yet", id);
                Ok(ResourceListing::InProgress)
            }
            _ => Err(failure("list resources", response).await),
        }
    }

    async fn resource_detail(
        &self,
        id: &ServiceInstanceId,
        resource_id: &str,
    ) -> ProvisionResult<serde_json::Value> {
        let url = format!(
            "{}/resources/{}",
            self.instance_url(id),
            urlencoding::encode(resource_id)
        );
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(failure("resource detail", response).await);
        }
        Ok(response.json().await?)
    }

    async fn vpn_config(&self, id: &ServiceInstanceId) -> ProvisionResult<serde_json::Value> {
        let url = format!("{}/vpnconfig", self.instance_url(id));
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(failure("vpn configuration", response).await);
        }
        let parsed: VpnConfigResponse = response.json().await?;
        Ok(parsed.vpn_config)
    }
}
