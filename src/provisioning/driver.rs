// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning driver
//!
//! Executes the steps requested by [`ProvisioningRun`] against a
//! [`ProvisioningSession`], one broker call at a time.

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::poll::{PollPolicy, Poller};
use super::report::{ProvisionFailure, RunReport};
use crate::broker::{ProvisioningSession, ServiceBroker};
use crate::domain::{DesiredState, ResourceListing};
use crate::errors::{ProvisionError, ProvisionResult};
use crate::state_machine::{
    Completion, Observation, ProvisioningRun, RunPhase, StateMachineWithHistory, Step,
};

/// Drives one provisioning run to completion
pub struct Provisioner<'a, B: ServiceBroker + ?Sized> {
    session: ProvisioningSession<'a, B>,
    desired: DesiredState,
    poll: PollPolicy,
    run_id: Uuid,
    changed: bool,
    instance_deleted: bool,
}

impl<'a, B: ServiceBroker + ?Sized> Provisioner<'a, B> {
    pub fn new(broker: &'a B, desired: DesiredState, poll: PollPolicy) -> Self {
        Self {
            session: ProvisioningSession::new(broker, desired.name()),
            desired,
            poll,
            run_id: Uuid::now_v7(),
            changed: false,
            instance_deleted: false,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run until the target state is reached or a step fails
    pub async fn run(mut self) -> Result<RunReport, ProvisionFailure> {
        let span = info_span!(
            "provision",
            run_id = %self.run_id,
            name = self.desired.name(),
            target = %self.desired.target(),
        );

        let mut fsm = StateMachineWithHistory::new(ProvisioningRun::new(
            self.desired.target(),
            self.desired.wait(),
        ));

        let outcome = self.drive(&mut fsm).instrument(span.clone()).await;
        let _entered = span.enter();

        match outcome {
            Ok((completion, resources)) => {
                info!("Run finished: {}", completion.message());
                let mut phases: Vec<RunPhase> =
                    fsm.get_history().iter().map(|t| t.from.phase()).collect();
                phases.push(fsm.current_state().phase());

                Ok(RunReport {
                    run_id: self.run_id,
                    changed: self.changed,
                    instance_deleted: self.instance_deleted,
                    message: completion.message().to_string(),
                    resources,
                    completion,
                    phases,
                })
            }
            Err(error) => {
                warn!(
                    "Run failed in phase {}: {}",
                    fsm.current_state().phase(),
                    error
                );
                Err(ProvisionFailure {
                    run_id: self.run_id,
                    error,
                    changed: self.changed,
                    instance_deleted: self.instance_deleted,
                })
            }
        }
    }

    async fn drive(
        &mut self,
        fsm: &mut StateMachineWithHistory<ProvisioningRun>,
    ) -> ProvisionResult<(Completion, Option<ResourceListing>)> {
        self.session.valid_connection().await?;
        let mut step = fsm.transition_with_history(Observation::ConnectionValid, Utc::now())?;

        let mut removal = Poller::new(self.poll, "instance removal");
        let mut readiness = Poller::new(self.poll, "instance readiness");

        let completion = loop {
            let observation = match step {
                Step::CheckExistence => {
                    Observation::from_existence(self.session.instance_exists().await?)
                }
                Step::Delete => {
                    self.session.delete_instance().await?;
                    self.instance_deleted = true;
                    self.changed = true;
                    Observation::DeleteSucceeded
                }
                Step::PollExistence => {
                    removal.next_check().await?;
                    Observation::from_existence(self.session.instance_exists().await?)
                }
                Step::Create => {
                    let spec = self.desired.spec().ok_or_else(|| {
                        ProvisionError::Configuration(
                            "no instance configuration to create from".to_string(),
                        )
                    })?;
                    self.session.create_instance(&spec).await?;
                    self.changed = true;
                    Observation::CreateAccepted
                }
                Step::PollReadiness => {
                    readiness.next_check().await?;
                    Observation::from_readiness(self.session.instance_ready().await?)
                }
                Step::Finish(completion) => break completion,
            };
            step = fsm.transition_with_history(observation, Utc::now())?;
        };

        let resources = if completion.reports_resources() {
            Some(self.current_resources().await)
        } else {
            None
        };
        Ok((completion, resources))
    }

    /// Resource listing for the report
    ///
    /// A failure here does not fail the run: the instance already exists or
    /// the broker accepted its creation.
    async fn current_resources(&mut self) -> ResourceListing {
        match self.session.resources_list().await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Could not retrieve resources of '{}': {}", self.session.name(), e);
                ResourceListing::InProgress
            }
        }
    }
}
