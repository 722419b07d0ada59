// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Run State Machine
//!
//! Pure FSM for one provisioning run. The driver performs the [`Step`] the
//! machine asks for, reports what it saw as an [`Observation`], and repeats
//! until the machine emits [`Step::Finish`].
//!
//! # Phases
//!
//! ```text
//! Validating ──ConnectionValid──> Inspecting
//! Inspecting ──InstanceFound────> Deleting          (absent, latest, reloaded)
//!            ──InstanceFound────> Finished(AlreadyPresent)   (present)
//!            ──InstanceMissing──> Finished(NotFound)         (absent)
//!            ──InstanceMissing──> Creating          (present, latest, reloaded)
//! Deleting   ──DeleteSucceeded──> Finished(Deleted)          (absent)
//!            ──DeleteSucceeded──> AwaitingRemoval   (latest, reloaded)
//! AwaitingRemoval ──InstanceFound──> AwaitingRemoval
//!                 ──InstanceMissing─> Creating
//! Creating   ──CreateAccepted───> AwaitingReady     (wait)
//!            ──CreateAccepted───> Finished(Requested)        (no wait)
//! AwaitingReady ──NotReady──> AwaitingReady
//!               ──Ready─────> Finished(Ready)
//! ```
//!
//! Failures are not inputs: a failed broker call aborts the run in the driver.

use serde::Serialize;
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::TargetState;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// `absent` requested and nothing to delete
    NotFound,
    /// `absent` requested and the instance was deleted
    Deleted,
    /// `present` requested and the instance already exists
    AlreadyPresent,
    /// Creation accepted, not waited for
    Requested,
    /// Creation accepted and resources are listed
    Ready,
}

impl Completion {
    /// Message reported to the caller
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "Instance name not found",
            Self::Deleted => "Instance deleted",
            Self::AlreadyPresent => "Instance by that name already exists",
            Self::Requested => "Instance requested",
            Self::Ready => "Instance ready",
        }
    }

    /// Whether the run ends by reporting the instance's resources
    pub fn reports_resources(&self) -> bool {
        matches!(self, Self::AlreadyPresent | Self::Requested | Self::Ready)
    }
}

/// Phase of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Validating,
    Inspecting,
    Deleting,
    AwaitingRemoval,
    Creating,
    AwaitingReady,
    Finished(Completion),
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished(completion) => write!(f, "Finished({:?})", completion),
            other => write!(f, "{:?}", other),
        }
    }
}

/// What the driver observed after performing a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    ConnectionValid,
    InstanceFound,
    InstanceMissing,
    DeleteSucceeded,
    CreateAccepted,
    NotReady,
    Ready,
}

impl Observation {
    pub fn from_existence(exists: bool) -> Self {
        if exists {
            Self::InstanceFound
        } else {
            Self::InstanceMissing
        }
    }

    pub fn from_readiness(ready: bool) -> Self {
        if ready {
            Self::Ready
        } else {
            Self::NotReady
        }
    }
}

/// Next action requested from the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CheckExistence,
    Delete,
    /// Wait one interval (except on the first check), then check existence again
    PollExistence,
    Create,
    /// Wait one interval (except on the first check), then check readiness
    PollReadiness,
    Finish(Completion),
}

/// State of one run: the declared target plus the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningRun {
    target: TargetState,
    wait: bool,
    phase: RunPhase,
}

impl ProvisioningRun {
    pub fn new(target: TargetState, wait: bool) -> Self {
        Self {
            target,
            wait,
            phase: RunPhase::Validating,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn target(&self) -> TargetState {
        self.target
    }

    fn to(&self, phase: RunPhase, step: Step) -> TransitionResult<(Self, Step)> {
        Ok((Self { phase, ..*self }, step))
    }

    fn finish(&self, completion: Completion) -> TransitionResult<(Self, Step)> {
        self.to(RunPhase::Finished(completion), Step::Finish(completion))
    }

    fn after_create(&self) -> TransitionResult<(Self, Step)> {
        if self.wait {
            self.to(RunPhase::AwaitingReady, Step::PollReadiness)
        } else {
            self.finish(Completion::Requested)
        }
    }
}

impl StateMachine for ProvisioningRun {
    type Input = Observation;
    type Output = Step;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use Observation::*;
        use RunPhase::*;

        match (self.phase, input) {
            (Validating, ConnectionValid) => self.to(Inspecting, Step::CheckExistence),

            (Inspecting, InstanceFound) if self.target.deletes_existing() => {
                self.to(Deleting, Step::Delete)
            }
            (Inspecting, InstanceFound) => self.finish(Completion::AlreadyPresent),
            (Inspecting, InstanceMissing) if self.target.creates() => {
                self.to(Creating, Step::Create)
            }
            (Inspecting, InstanceMissing) => self.finish(Completion::NotFound),

            (Deleting, DeleteSucceeded) if self.target.creates() => {
                self.to(AwaitingRemoval, Step::PollExistence)
            }
            (Deleting, DeleteSucceeded) => self.finish(Completion::Deleted),

            (AwaitingRemoval, InstanceFound) => self.to(AwaitingRemoval, Step::PollExistence),
            (AwaitingRemoval, InstanceMissing) => self.to(Creating, Step::Create),

            (Creating, CreateAccepted) => self.after_create(),

            (AwaitingReady, NotReady) => self.to(AwaitingReady, Step::PollReadiness),
            (AwaitingReady, Ready) => self.finish(Completion::Ready),

            (phase, input) => Err(TransitionError::InvalidTransition {
                from: phase.to_string(),
                input: format!("{:?}", input),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use Observation::*;
        use RunPhase::*;

        match self.phase {
            Validating => vec![ConnectionValid],
            Inspecting | AwaitingRemoval => vec![InstanceFound, InstanceMissing],
            Deleting => vec![DeleteSucceeded],
            Creating => vec![CreateAccepted],
            AwaitingReady => vec![NotReady, Ready],
            Finished(_) => vec![],
        }
    }
}
