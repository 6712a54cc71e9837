use serde::{Deserialize, Serialize};

/// Reason recorded when the eligibility lookup itself failed.
pub const SYSTEM_ERROR_REASON: &str = "system_error";

/// Server-computed verdict on whether trial offers may be shown to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialEligibility {
    pub eligible: bool,
    pub can_show_trial_info: bool,
    #[serde(default)]
    pub trial_days: u32,
    #[serde(default)]
    pub has_active_subscriptions: bool,
    #[serde(default)]
    pub subscription_count: u32,
    #[serde(default)]
    pub reason: String,
}

impl TrialEligibility {
    /// Verdict used whenever the lookup fails: never eligible, never shown.
    pub fn fail_closed() -> Self {
        Self {
            eligible: false,
            can_show_trial_info: false,
            trial_days: 0,
            has_active_subscriptions: false,
            subscription_count: 0,
            reason: SYSTEM_ERROR_REASON.to_string(),
        }
    }
}
