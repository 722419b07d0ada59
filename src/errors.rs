// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for provisioning operations

use std::time::Duration;
use thiserror::Error;

use crate::state_machine::TransitionError;

/// Errors that can occur while provisioning a service instance
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Unknown region, missing required field, or malformed setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The identity endpoint refused the API key
    #[error("Token request failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    /// The organization/space probe failed before any mutation
    #[error("{0}")]
    Connectivity(String),

    /// The broker answered a call with an unexpected status code
    ///
    /// `body` is the raw response text; no structure is assumed.
    #[error("{body}")]
    BrokerOperation {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Clustered and ND service types are not handled
    #[error("Unsupported service instance type: {0}")]
    UnsupportedServiceType(String),

    /// No service instance with the given name exists in the space
    #[error("Could not find service instance with name {0}")]
    InstanceNotFound(String),

    /// A polling loop did not converge within its budget
    #[error("Timed out after {elapsed:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: &'static str,
        elapsed: Duration,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// A 2xx response body did not have the expected shape
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The run state machine was fed an observation it cannot accept
    #[error("Invalid provisioning transition: {0}")]
    InvalidTransition(#[from] TransitionError),
}

impl ProvisionError {
    /// Whether this error was raised before any network call was made
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProvisionError::Configuration(_))
    }
}

/// Result type for provisioning operations
pub type ProvisionResult<T> = Result<T, ProvisionError>;

impl From<reqwest::Error> for ProvisionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProvisionError::Deserialization(err.to_string())
        } else {
            ProvisionError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(err: serde_json::Error) -> Self {
        ProvisionError::Deserialization(err.to_string())
    }
}
