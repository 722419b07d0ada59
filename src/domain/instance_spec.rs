// Copyright (c) 2025 - Cowboy AI, Inc.
//! Desired Service Instance Configuration
//!
//! A [`ServiceInstanceSpec`] is built once from input and never mutated. Each
//! instance type carries only the fields the broker accepts for it, so a Cell
//! without a controller size cannot be represented.
//!
//! | Type | VM size | Controller size | App VMs | Software level |
//! |---|---|---|---|---|
//! | WASBase | required | - | - | optional |
//! | WASCell | required | required | required | optional |
//! | WASNDServer | required | - | - | optional |
//! | LibertyCore | required | - | - | - |
//! | LibertyCollective | required | required | required | - |
//! | LibertyNDServer | required | - | - | - |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ProvisionError, ProvisionResult};

/// Broker service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceType {
    #[serde(rename = "WASBase")]
    BaseServer,
    #[serde(rename = "WASCell")]
    Cell,
    #[serde(rename = "WASNDServer")]
    NdServer,
    #[serde(rename = "LibertyCore")]
    LibertyCore,
    #[serde(rename = "LibertyCollective")]
    LibertyCollective,
    #[serde(rename = "LibertyNDServer")]
    LibertyNdServer,
}

impl InstanceType {
    /// Every instance type the broker offers
    pub const ALL: [InstanceType; 6] = [
        InstanceType::BaseServer,
        InstanceType::Cell,
        InstanceType::NdServer,
        InstanceType::LibertyCore,
        InstanceType::LibertyCollective,
        InstanceType::LibertyNdServer,
    ];

    /// Name used by the broker
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseServer => "WASBase",
            Self::Cell => "WASCell",
            Self::NdServer => "WASNDServer",
            Self::LibertyCore => "LibertyCore",
            Self::LibertyCollective => "LibertyCollective",
            Self::LibertyNdServer => "LibertyNDServer",
        }
    }

    /// Types that need a controller VM and an application VM count
    pub fn requires_topology(&self) -> bool {
        matches!(self, Self::Cell | Self::LibertyCollective)
    }

    /// Types that accept a software level
    pub fn accepts_software_level(&self) -> bool {
        matches!(self, Self::BaseServer | Self::NdServer | Self::Cell)
    }
}

impl FromStr for InstanceType {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstanceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                ProvisionError::Configuration(format!(
                    "Unknown instance type '{}', valid options: LibertyCollective, LibertyCore, \
                     LibertyNDServer, WASBase, WASCell, WASNDServer",
                    s
                ))
            })
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Virtual machine size, normalized to upper case (e.g. "S", "M", "XL")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmSize(String);

impl VmSize {
    pub fn new(size: impl AsRef<str>) -> ProvisionResult<Self> {
        let size = size.as_ref().trim();
        if size.is_empty() {
            return Err(ProvisionError::Configuration("VM size is empty".to_string()));
        }
        if !size.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProvisionError::Configuration(format!(
                "Invalid VM size '{}'",
                size
            )));
        }
        Ok(Self(size.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VmSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Controller size and application VM count for multi-VM topologies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub controller_size: VmSize,
    pub app_vms: u32,
}

/// Type-specific instance configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceConfiguration {
    BaseServer {
        size: VmSize,
        software_level: Option<String>,
    },
    Cell {
        size: VmSize,
        topology: Topology,
        software_level: Option<String>,
    },
    NdServer {
        size: VmSize,
        software_level: Option<String>,
    },
    LibertyCore {
        size: VmSize,
    },
    LibertyCollective {
        size: VmSize,
        topology: Topology,
    },
    LibertyNdServer {
        size: VmSize,
    },
}

/// Loose field set as supplied by a front-end, before validation
#[derive(Debug, Clone, Default)]
pub struct ConfigurationFields<'a> {
    pub size: Option<&'a str>,
    pub controller_size: Option<&'a str>,
    pub app_vms: Option<u32>,
    pub software_level: Option<&'a str>,
}

impl InstanceConfiguration {
    /// Validate the field combination for `instance_type`
    ///
    /// Fields that the type does not use are ignored.
    pub fn new(instance_type: InstanceType, fields: ConfigurationFields<'_>) -> ProvisionResult<Self> {
        let size = match fields.size {
            Some(size) => VmSize::new(size)?,
            None => {
                return Err(missing_field(instance_type, "size"));
            }
        };

        let topology = if instance_type.requires_topology() {
            let controller_size = fields
                .controller_size
                .ok_or_else(|| missing_field(instance_type, "controller_size"))?;
            let app_vms = fields
                .app_vms
                .ok_or_else(|| missing_field(instance_type, "app_vms"))?;
            if app_vms == 0 {
                return Err(ProvisionError::Configuration(
                    "app_vms must be at least 1".to_string(),
                ));
            }
            Some(Topology {
                controller_size: VmSize::new(controller_size)?,
                app_vms,
            })
        } else {
            None
        };

        let software_level = fields
            .software_level
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .map(str::to_string);

        let config = match (instance_type, topology) {
            (InstanceType::BaseServer, _) => Self::BaseServer { size, software_level },
            (InstanceType::NdServer, _) => Self::NdServer { size, software_level },
            (InstanceType::LibertyCore, _) => Self::LibertyCore { size },
            (InstanceType::LibertyNdServer, _) => Self::LibertyNdServer { size },
            (InstanceType::Cell, Some(topology)) => Self::Cell {
                size,
                topology,
                software_level,
            },
            (InstanceType::LibertyCollective, Some(topology)) => {
                Self::LibertyCollective { size, topology }
            }
            (t, None) => return Err(missing_field(t, "controller_size")),
        };

        Ok(config)
    }

    pub fn instance_type(&self) -> InstanceType {
        match self {
            Self::BaseServer { .. } => InstanceType::BaseServer,
            Self::Cell { .. } => InstanceType::Cell,
            Self::NdServer { .. } => InstanceType::NdServer,
            Self::LibertyCore { .. } => InstanceType::LibertyCore,
            Self::LibertyCollective { .. } => InstanceType::LibertyCollective,
            Self::LibertyNdServer { .. } => InstanceType::LibertyNdServer,
        }
    }

    /// Application server VM size
    pub fn size(&self) -> &VmSize {
        match self {
            Self::BaseServer { size, .. }
            | Self::Cell { size, .. }
            | Self::NdServer { size, .. }
            | Self::LibertyCore { size }
            | Self::LibertyCollective { size, .. }
            | Self::LibertyNdServer { size } => size,
        }
    }

    pub fn topology(&self) -> Option<&Topology> {
        match self {
            Self::Cell { topology, .. } | Self::LibertyCollective { topology, .. } => Some(topology),
            _ => None,
        }
    }

    pub fn software_level(&self) -> Option<&str> {
        match self {
            Self::BaseServer { software_level, .. }
            | Self::Cell { software_level, .. }
            | Self::NdServer { software_level, .. } => software_level.as_deref(),
            _ => None,
        }
    }
}

fn missing_field(instance_type: InstanceType, field: &str) -> ProvisionError {
    ProvisionError::Configuration(format!(
        "instance_type is {} but the following is missing: {}",
        instance_type, field
    ))
}

/// Desired service instance: a name plus its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstanceSpec {
    pub name: String,
    pub configuration: InstanceConfiguration,
}

impl ServiceInstanceSpec {
    pub fn new(name: impl Into<String>, configuration: InstanceConfiguration) -> Self {
        Self {
            name: name.into(),
            configuration,
        }
    }

    /// Build the broker creation payload
    pub fn to_payload(&self) -> CreateInstancePayload {
        let topology = self.configuration.topology();
        CreateInstancePayload {
            instance_type: self.configuration.instance_type(),
            name: self.name.clone(),
            application_server_vm_size: self.configuration.size().clone(),
            control_server_vm_size: topology.map(|t| t.controller_size.clone()),
            number_of_application_vms: topology.map(|t| t.app_vms),
            software_level: self.configuration.software_level().map(str::to_string),
        }
    }
}

/// Body of the create-instance request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInstancePayload {
    #[serde(rename = "Type")]
    pub instance_type: InstanceType,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "ApplicationServerVMSize")]
    pub application_server_vm_size: VmSize,

    #[serde(rename = "ControlServerVMSize", skip_serializing_if = "Option::is_none")]
    pub control_server_vm_size: Option<VmSize>,

    #[serde(rename = "NumberOfApplicationVMs", skip_serializing_if = "Option::is_none")]
    pub number_of_application_vms: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_level: Option<String>,
}
