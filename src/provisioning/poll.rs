// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bounded polling for broker convergence

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::{ProvisionError, ProvisionResult};

/// Fixed-interval polling with an overall budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive checks
    pub interval: Duration,

    /// Total time a single wait may take before giving up
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_wait: Duration) -> ProvisionResult<Self> {
        if interval.is_zero() {
            return Err(ProvisionError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if max_wait < interval {
            return Err(ProvisionError::Configuration(format!(
                "max wait {:?} is shorter than the poll interval {:?}",
                max_wait, interval
            )));
        }
        Ok(Self { interval, max_wait })
    }

    /// Upper bound on the number of checks one wait performs
    pub fn max_checks(&self) -> u32 {
        let checks = self.max_wait.as_nanos() / self.interval.as_nanos();
        u32::try_from(checks).unwrap_or(u32::MAX).saturating_add(1)
    }
}

/// Tracks one wait loop
///
/// The first check runs immediately and starts the clock; every later check
/// is preceded by one interval of sleep. Sleeping past `max_wait` is refused
/// with a timeout.
#[derive(Debug)]
pub(crate) struct Poller {
    policy: PollPolicy,
    waiting_for: &'static str,
    started: Option<Instant>,
    checks: u32,
}

impl Poller {
    pub(crate) fn new(policy: PollPolicy, waiting_for: &'static str) -> Self {
        Self {
            policy,
            waiting_for,
            started: None,
            checks: 0,
        }
    }

    /// Wait until the next check is due
    pub(crate) async fn next_check(&mut self) -> ProvisionResult<()> {
        let started = *self.started.get_or_insert_with(Instant::now);
        if self.checks > 0 {
            let elapsed = started.elapsed();
            if elapsed + self.policy.interval > self.policy.max_wait
                || self.checks >= self.policy.max_checks()
            {
                return Err(ProvisionError::Timeout {
                    waiting_for: self.waiting_for,
                    elapsed,
                });
            }
            debug!(
                "Waiting {:?} for {} (check {})",
                self.policy.interval,
                self.waiting_for,
                self.checks + 1
            );
            tokio::time::sleep(self.policy.interval).await;
        }
        self.checks += 1;
        Ok(())
    }
}
