use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// How often a plan is billed. Declaration order is display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum BillingPeriod {
    Monthly,
    Quarterly,
    Biannual,
    Annual,
}

impl BillingPeriod {
    pub const ALL: [BillingPeriod; 4] = [
        BillingPeriod::Monthly,
        BillingPeriod::Quarterly,
        BillingPeriod::Biannual,
        BillingPeriod::Annual,
    ];

    pub fn months(&self) -> u32 {
        match self {
            BillingPeriod::Monthly => 1,
            BillingPeriod::Quarterly => 3,
            BillingPeriod::Biannual => 6,
            BillingPeriod::Annual => 12,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "Monthly",
            BillingPeriod::Quarterly => "Quarterly",
            BillingPeriod::Biannual => "Every 6 months",
            BillingPeriod::Annual => "Yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TrialTimeUnit {
    Days,
    Weeks,
    Months,
    Years,
    Unlimited,
}

/// A purchasable subscription tier, as served by `GET /billing/plans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub product: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub billing_period: BillingPeriod,
    /// Trial length in `trial_time_unit`s (0 = no trial)
    #[serde(default)]
    pub trial_length: u32,
    #[serde(default)]
    pub trial_time_unit: Option<TrialTimeUnit>,
    /// CPU cores allotted to the instance
    pub cpu_limit: f64,
    /// Memory limit in backend notation, e.g. "2G"
    pub memory_limit: String,
    /// Storage limit in backend notation, e.g. "10G"
    pub storage_limit: String,
}

impl Plan {
    pub fn has_trial(&self) -> bool {
        self.trial_length > 0
    }
}

/// Envelope of `GET /billing/plans`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlansResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A plan as handed to the rendering layer.
///
/// Built only by [`crate::trial::to_display_plan`], which guarantees that an
/// ineligible caller never sees trial numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPlan {
    #[serde(flatten)]
    pub plan: Plan,
    pub display_trial: bool,
}
