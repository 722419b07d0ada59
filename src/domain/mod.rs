// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Domain Models
//!
//! Value objects describing what the caller wants ([`DesiredState`],
//! [`ServiceInstanceSpec`]) and what the broker reports ([`ServiceInstance`],
//! [`ResourceListing`]).
//!
//! # Value Objects with Invariants
//!
//! - [`Region`] - one of the fixed broker regions
//! - [`VmSize`] - upper-cased VM size code
//! - [`InstanceConfiguration`] - per-type legal field set
//! - [`DesiredState`] - configuration present whenever the run may create

pub mod desired_state;
pub mod instance;
pub mod instance_spec;
pub mod region;

pub use desired_state::{DesiredState, TargetState};
pub use instance::{
    InstanceDetails, ResourceListing, ResourceRecord, ServiceInstance, ServiceInstanceEntry,
    ServiceInstanceId,
};
pub use instance_spec::{
    ConfigurationFields, CreateInstancePayload, InstanceConfiguration, InstanceType,
    ServiceInstanceSpec, Topology, VmSize,
};
pub use region::{Region, DEFAULT_PROVIDER_DOMAIN};
