// Copyright (c) 2025 - Cowboy AI, Inc.
//! Caller-facing run outcomes
//!
//! A run ends in one of three ways:
//! - success without change (`changed = false`)
//! - success with change (`changed = true`)
//! - failure, with the flags telling how far the run got before failing

use serde::Serialize;
use uuid::Uuid;

use crate::domain::ResourceListing;
use crate::errors::ProvisionError;
use crate::state_machine::{Completion, RunPhase};

/// Successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub changed: bool,
    pub instance_deleted: bool,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceListing>,
    #[serde(skip)]
    pub completion: Completion,
    #[serde(skip)]
    pub phases: Vec<RunPhase>,
}

/// Failed run
///
/// Completed steps are not rolled back: after a successful delete followed by
/// a failed create, `instance_deleted` and `changed` are both true.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ProvisionFailure {
    pub run_id: Uuid,
    #[source]
    pub error: ProvisionError,
    pub changed: bool,
    pub instance_deleted: bool,
}

impl ProvisionFailure {
    /// Failure raised before the run touched the broker
    pub fn before_run(error: ProvisionError) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            error,
            changed: false,
            instance_deleted: false,
        }
    }

    /// JSON document in the shape a front-end reports
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failed": true,
            "msg": self.error.to_string(),
            "changed": self.changed,
            "instance_deleted": self.instance_deleted,
            "run_id": self.run_id,
        })
    }
}

impl From<ProvisionError> for ProvisionFailure {
    fn from(error: ProvisionError) -> Self {
        Self::before_run(error)
    }
}
