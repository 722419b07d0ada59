// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared Target State

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::instance_spec::{InstanceConfiguration, ServiceInstanceSpec};
use crate::errors::{ProvisionError, ProvisionResult};

/// Target state declared by the caller
///
/// `Latest` and `Reloaded` behave identically: delete, then recreate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    #[default]
    Present,
    Absent,
    Latest,
    Reloaded,
}

impl TargetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Latest => "latest",
            Self::Reloaded => "reloaded",
        }
    }

    /// Whether an existing instance is deleted first
    pub fn deletes_existing(&self) -> bool {
        !matches!(self, Self::Present)
    }

    /// Whether the run ends with an instance in place
    pub fn creates(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl FromStr for TargetState {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "latest" => Ok(Self::Latest),
            "reloaded" => Ok(Self::Reloaded),
            other => Err(ProvisionError::Configuration(format!(
                "Unknown state '{}', expected one of: present, absent, latest, reloaded",
                other
            ))),
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the provisioning run needs to know about the desired outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    name: String,
    target: TargetState,
    configuration: Option<InstanceConfiguration>,
    wait: bool,
}

impl DesiredState {
    /// Validate that a configuration is present whenever the run may create
    pub fn new(
        name: impl Into<String>,
        target: TargetState,
        configuration: Option<InstanceConfiguration>,
        wait: bool,
    ) -> ProvisionResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProvisionError::Configuration(
                "Instance name is empty".to_string(),
            ));
        }
        if target.creates() && configuration.is_none() {
            return Err(ProvisionError::Configuration(format!(
                "state is {} but instance_type is missing",
                target
            )));
        }
        Ok(Self {
            name,
            target,
            configuration,
            wait,
        })
    }

    /// Convenience constructor for `absent`
    pub fn absent(name: impl Into<String>) -> ProvisionResult<Self> {
        Self::new(name, TargetState::Absent, None, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> TargetState {
        self.target
    }

    pub fn wait(&self) -> bool {
        self.wait
    }

    /// Spec to create, if this run creates anything
    pub fn spec(&self) -> Option<ServiceInstanceSpec> {
        self.configuration
            .as_ref()
            .map(|config| ServiceInstanceSpec::new(self.name.clone(), config.clone()))
    }
}
