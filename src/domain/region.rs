// Copyright (c) 2025 - Cowboy AI, Inc.
//! Broker Region Value Object
//!
//! The broker is deployed in a fixed set of regions. Each region has its own
//! identity endpoint and broker endpoint; an unknown region is rejected when
//! the value is parsed, before any network call is attempted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ProvisionError;

/// Provider domain used when none is configured
pub const DEFAULT_PROVIDER_DOMAIN: &str = "bluemix.net";

/// Region hosting a broker deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Dallas
    #[serde(rename = "ng")]
    UsSouth,
    /// London
    #[serde(rename = "eu-gb")]
    EuGb,
    /// Frankfurt
    #[serde(rename = "eu-de")]
    EuDe,
    /// Sydney
    #[serde(rename = "au-syd")]
    AuSyd,
}

impl Region {
    /// Every supported region
    pub const ALL: [Region; 4] = [Region::UsSouth, Region::EuGb, Region::EuDe, Region::AuSyd];

    /// Region key as used in host names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsSouth => "ng",
            Self::EuGb => "eu-gb",
            Self::EuDe => "eu-de",
            Self::AuSyd => "au-syd",
        }
    }

    /// Token endpoint for this region
    pub fn token_url(&self, provider_domain: &str) -> String {
        format!("https://iam.{}.{}/oidc/token", self.as_str(), provider_domain)
    }

    /// Base URL of the broker REST API for this region
    pub fn broker_base_url(&self, provider_domain: &str) -> String {
        format!(
            "https://wasaas-broker.{}.{}/wasaas-broker/api/v1",
            self.as_str(),
            provider_domain
        )
    }
}

impl FromStr for Region {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| {
                ProvisionError::Configuration(format!(
                    "Unknown region '{}', expected one of: ng, eu-gb, eu-de, au-syd",
                    s
                ))
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
