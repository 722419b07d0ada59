//! Provisioning for WebSphere-as-a-Service instances
//!
//! This crate drives a regional service broker from a declarative desired
//! state: it acquires a bearer token, checks whether the named instance
//! exists, and performs idempotent create/delete transitions, polling the
//! broker until it converges.

pub mod auth;
pub mod broker;
pub mod config;
pub mod domain;
pub mod errors;
pub mod provisioning;
pub mod state_machine;

// Re-export commonly used types
pub use auth::{ApiKey, BearerToken, IamTokenProvider};
pub use broker::{BrokerClient, ProvisioningSession, ServiceBroker};
pub use config::{Credentials, ProvisionRequest, ProvisionerSettings, Scope};
pub use errors::{ProvisionError, ProvisionResult};
pub use provisioning::{provision, PollPolicy, ProvisionFailure, Provisioner, RunReport};
