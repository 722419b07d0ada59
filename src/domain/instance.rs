// Copyright (c) 2025 - Cowboy AI, Inc.
//! Observed Service Instance State
//!
//! Shapes returned by the broker. Nothing here is cached across runs; every
//! value is re-derived from broker responses.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Broker-assigned service instance identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceInstanceId(String);

impl ServiceInstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One element of the instance listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceEntry {
    #[serde(rename = "ServiceInstance")]
    pub service_instance: ServiceInstance,
}

/// Instance summary as listed by the broker
///
/// Some deployment types are listed without a `Name`, and some of those
/// without a `ServiceInstanceID` either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    #[serde(rename = "ServiceInstanceID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServiceInstanceId>,

    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "ServiceType", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServiceInstance {
    /// ID of the entry, if it carries both an ID and a `Name` equal to `name`
    pub fn id_if_named(&self, name: &str) -> Option<&ServiceInstanceId> {
        self.id
            .as_ref()
            .filter(|_| self.name.as_deref() == Some(name))
    }

    /// True only when the entry carries an ID and a `Name` equal to `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.id_if_named(name).is_some()
    }
}

/// Per-VM resource record
///
/// Known fields are lifted out; everything else the broker sends is kept
/// in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "osHostname", default, skip_serializing_if = "Option::is_none")]
    pub os_hostname: Option<String>,

    #[serde(rename = "osAdminPassword", default, skip_serializing_if = "Option::is_none")]
    pub os_admin_password: Option<String>,

    #[serde(rename = "wasAdminUser", default, skip_serializing_if = "Option::is_none")]
    pub was_admin_user: Option<String>,

    #[serde(rename = "wasAdminPass", default, skip_serializing_if = "Option::is_none")]
    pub was_admin_pass: Option<String>,

    #[serde(rename = "vpnConfigLink", default, skip_serializing_if = "Option::is_none")]
    pub vpn_config_link: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Result of asking the broker for an instance's resources
///
/// `InProgress` means the broker answered 404, which happens while a create or
/// delete is still running. It is distinct from an empty `Available` list.
/// Serializes as the record array, or `false` when in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceListing {
    Available(Vec<ResourceRecord>),
    InProgress,
}

impl ResourceListing {
    /// Records, if the broker returned any listing at all
    pub fn records(&self) -> Option<&[ResourceRecord]> {
        match self {
            Self::Available(records) => Some(records),
            Self::InProgress => None,
        }
    }

    /// Readiness: at least one resource record present
    pub fn is_ready(&self) -> bool {
        self.records().is_some_and(|records| !records.is_empty())
    }
}

impl Serialize for ResourceListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Available(records) => records.serialize(serializer),
            Self::InProgress => serializer.serialize_bool(false),
        }
    }
}

/// Admin access details of a provisioned base server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceDetails {
    pub instance_id: ServiceInstanceId,
    pub admin_host: Option<String>,
    pub root_password: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub vpn_config_link: Option<String>,
    pub resources: Vec<ResourceRecord>,
}

impl InstanceDetails {
    /// Lift the admin fields from the first resource record
    pub fn from_resources(instance_id: ServiceInstanceId, resources: Vec<ResourceRecord>) -> Self {
        let first = resources.first();
        Self {
            instance_id,
            admin_host: first.and_then(|r| r.os_hostname.clone()),
            root_password: first.and_then(|r| r.os_admin_password.clone()),
            admin_user: first.and_then(|r| r.was_admin_user.clone()),
            admin_password: first.and_then(|r| r.was_admin_pass.clone()),
            vpn_config_link: first.and_then(|r| r.vpn_config_link.clone()),
            resources,
        }
    }
}
