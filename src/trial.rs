//! Trial visibility: what trial information a caller is allowed to see.

use crate::models::{DisplayPlan, Plan, TrialEligibility};

/// Derive the display copy of a plan.
///
/// With no verdict yet the trial is shown optimistically. Once a verdict says
/// trial info may not be shown, the trial length and unit are stripped from the
/// copy so that no trial numbers reach the rendering layer.
pub fn to_display_plan(plan: &Plan, eligibility: Option<&TrialEligibility>) -> DisplayPlan {
    let mut plan = plan.clone();

    let display_trial = match eligibility {
        Some(verdict) if !verdict.can_show_trial_info => {
            plan.trial_length = 0;
            plan.trial_time_unit = None;
            false
        }
        _ => plan.has_trial(),
    };

    DisplayPlan {
        plan,
        display_trial,
    }
}

pub fn to_display_plans(plans: &[Plan], eligibility: Option<&TrialEligibility>) -> Vec<DisplayPlan> {
    plans
        .iter()
        .map(|plan| to_display_plan(plan, eligibility))
        .collect()
}
