// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioner Configuration
//!
//! Two inputs drive a run:
//!
//! - [`ProvisionRequest`]: the desired state as a front-end supplies it
//!   (parameter names match the declarative task interface)
//! - [`ProvisionerSettings`]: operational knobs (poll cadence, timeouts,
//!   endpoint overrides), loaded from environment variables
//!
//! Both are validated before any network call is made.

use serde::Deserialize;
use std::time::Duration;

use crate::auth::ApiKey;
use crate::domain::{
    ConfigurationFields, DesiredState, InstanceConfiguration, InstanceType, Region, TargetState,
    DEFAULT_PROVIDER_DOMAIN,
};
use crate::errors::{ProvisionError, ProvisionResult};
use crate::provisioning::PollPolicy;

/// Region plus API key, immutable once supplied
#[derive(Debug, Clone)]
pub struct Credentials {
    pub region: Region,
    pub api_key: ApiKey,
}

/// Organization and space scoping every broker call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub org: String,
    pub space: String,
}

impl Scope {
    pub fn new(org: impl Into<String>, space: impl Into<String>) -> ProvisionResult<Self> {
        let org = org.into();
        let space = space.into();
        if org.trim().is_empty() || space.trim().is_empty() {
            return Err(ProvisionError::Configuration(
                "org and space must not be empty".to_string(),
            ));
        }
        Ok(Self { org, space })
    }
}

/// Desired-state parameters as supplied by a front-end
///
/// ```json
/// {
///   "state": "present",
///   "name": "temp_dev_env",
///   "instance_type": "WASBase",
///   "size": "M",
///   "region": "ng",
///   "org": "my-org",
///   "space": "dev",
///   "apikey": "...",
///   "wait": true
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub state: TargetState,
    pub name: String,
    #[serde(default)]
    pub wait: bool,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub app_vms: Option<u32>,
    #[serde(default)]
    pub controller_size: Option<String>,
    #[serde(default)]
    pub software_level: Option<String>,
    pub region: String,
    pub org: String,
    pub space: String,
    pub apikey: String,
}

impl ProvisionRequest {
    /// Validate and split into credentials, scope and desired state
    ///
    /// An instance type, when given, is validated even for `absent`.
    pub fn into_parts(self) -> ProvisionResult<(Credentials, Scope, DesiredState)> {
        let region: Region = self.region.parse()?;
        let api_key = ApiKey::new(self.apikey)?;
        let scope = Scope::new(self.org, self.space)?;

        let configuration = match self.instance_type.as_deref() {
            Some(instance_type) => {
                let instance_type: InstanceType = instance_type.parse()?;
                Some(InstanceConfiguration::new(
                    instance_type,
                    ConfigurationFields {
                        size: self.size.as_deref(),
                        controller_size: self.controller_size.as_deref(),
                        app_vms: self.app_vms,
                        software_level: self.software_level.as_deref(),
                    },
                )?)
            }
            None => None,
        };

        let desired = DesiredState::new(self.name, self.state, configuration, self.wait)?;
        Ok((Credentials { region, api_key }, scope, desired))
    }
}

/// Operational settings for a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerSettings {
    /// Interval and budget for existence/readiness polling
    pub poll: PollPolicy,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,

    /// Domain the regional host names live under
    pub provider_domain: String,

    /// Replaces the region-derived token URL when set
    pub token_url: Option<String>,

    /// Replaces the region-derived broker base URL when set
    pub broker_url: Option<String>,
}

impl Default for ProvisionerSettings {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            http_timeout: Duration::from_secs(30),
            provider_domain: DEFAULT_PROVIDER_DOMAIN.to_string(),
            token_url: None,
            broker_url: None,
        }
    }
}

impl ProvisionerSettings {
    /// Load settings from `WASAAS_*` environment variables
    pub fn from_env() -> ProvisionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ProvisionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let interval = seconds(&lookup, "WASAAS_POLL_INTERVAL_SECS")?
            .unwrap_or(defaults.poll.interval);
        let max_wait = seconds(&lookup, "WASAAS_MAX_WAIT_SECS")?
            .unwrap_or(defaults.poll.max_wait);
        let http_timeout = seconds(&lookup, "WASAAS_HTTP_TIMEOUT_SECS")?
            .unwrap_or(defaults.http_timeout);

        Ok(Self {
            poll: PollPolicy::new(interval, max_wait)?,
            http_timeout,
            provider_domain: lookup("WASAAS_PROVIDER_DOMAIN")
                .filter(|d| !d.is_empty())
                .unwrap_or(defaults.provider_domain),
            token_url: lookup("WASAAS_TOKEN_URL").filter(|u| !u.is_empty()),
            broker_url: lookup("WASAAS_BROKER_URL").filter(|u| !u.is_empty()),
        })
    }

    pub fn token_url(&self, region: Region) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| region.token_url(&self.provider_domain))
    }

    pub fn broker_url(&self, region: Region) -> String {
        self.broker_url
            .clone()
            .unwrap_or_else(|| region.broker_base_url(&self.provider_domain))
    }
}

fn seconds<F>(lookup: &F, key: &str) -> ProvisionResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| ProvisionError::Configuration(format!("{}={}: {}", key, raw, e))),
        None => Ok(None),
    }
}
