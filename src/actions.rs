//! Instance lifecycle actions (start/stop/restart/backup) with status polling.

use std::time::Duration;

use crate::api::PortalBackend;
use crate::error::{PortalError, Result};
use crate::models::{InstanceAction, InstanceStatus, InstanceSummary};
use crate::scope::PageScope;

/// Bounded exponential backoff for status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl PollPolicy {
    /// Delay before poll number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The instance reached the action's target status
    Completed(InstanceSummary),
    /// The instance went into the error state
    Failed(InstanceSummary),
    /// Attempts ran out; carries the last status seen
    TimedOut(InstanceStatus),
}

/// Request `action` and poll until it settles or the policy runs out.
///
/// The action itself is sent once and never retried.
pub async fn run_instance_action<B: PortalBackend>(
    backend: &B,
    scope: &PageScope,
    instance_id: &str,
    action: InstanceAction,
    policy: &PollPolicy,
) -> Result<ActionOutcome> {
    let accepted = scope.run(backend.instance_action(instance_id, action)).await?;
    if !accepted.success {
        let message = if accepted.message.is_empty() {
            format!("Backend refused to {} instance", action.as_ref())
        } else {
            accepted.message
        };
        return Err(PortalError::validation(message));
    }

    tracing::info!(instance_id = %instance_id, action = action.as_ref(), "Instance action accepted");

    let target = action.target_status();
    let mut last = InstanceStatus::Unknown;

    for attempt in 0..policy.max_attempts {
        scope
            .run(async {
                tokio::time::sleep(policy.delay_for(attempt)).await;
                Ok(())
            })
            .await?;

        let instance = scope.run(backend.get_instance(instance_id)).await?;
        last = instance.status;

        if instance.status == InstanceStatus::Error {
            tracing::warn!(
                instance_id = %instance_id,
                action = action.as_ref(),
                error = instance.error_message.as_deref().unwrap_or(""),
                "Instance entered error state"
            );
            return Ok(ActionOutcome::Failed(instance));
        }
        if instance.status == target {
            return Ok(ActionOutcome::Completed(instance));
        }

        tracing::debug!(
            instance_id = %instance_id,
            attempt,
            status = instance.status.as_ref(),
            "Waiting for instance action"
        );
    }

    Ok(ActionOutcome::TimedOut(last))
}
