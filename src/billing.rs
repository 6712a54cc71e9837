//! Billing-period math for plan cards.
//!
//! Everything here is display-only; the backend computes what is charged.

use std::collections::BTreeSet;

use chrono::{Days, Months, NaiveDate};

use crate::models::{BillingPeriod, Plan, TrialTimeUnit};

pub fn months_in_period(period: BillingPeriod) -> u32 {
    period.months()
}

/// Price per month over the plan's billing period.
pub fn monthly_equivalent(plan: &Plan) -> f64 {
    plan.price / f64::from(months_in_period(plan.billing_period))
}

/// Whole-percent saving of `plan` against a monthly base price.
///
/// Zero when the base is missing, zero or non-finite, when the plan is free, or
/// when the plan is not actually cheaper per month.
pub fn savings_percent(plan: &Plan, base_monthly_price: Option<f64>) -> u32 {
    let Some(base) = base_monthly_price.filter(|b| b.is_finite() && *b > 0.0) else {
        return 0;
    };
    let monthly = monthly_equivalent(plan);
    if !monthly.is_finite() || monthly <= 0.0 {
        return 0;
    }

    let percent = ((1.0 - monthly / base) * 100.0).round();
    if percent <= 0.0 { 0 } else { percent.min(100.0) as u32 }
}

/// Two-decimal rendering used on plan cards, e.g. `7.42`.
pub fn format_price(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Price of the monthly plan of the same product, the baseline for savings.
pub fn base_monthly_price(plans: &[Plan], product: &str) -> Option<f64> {
    plans
        .iter()
        .find(|p| p.product == product && p.billing_period == BillingPeriod::Monthly && p.price > 0.0)
        .map(|p| p.price)
}

/// Billing periods offered by the catalog, in display order.
pub fn available_periods(plans: &[Plan]) -> Vec<BillingPeriod> {
    plans
        .iter()
        .map(|p| p.billing_period)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn plans_for_period(plans: &[Plan], period: BillingPeriod) -> Vec<&Plan> {
    plans.iter().filter(|p| p.billing_period == period).collect()
}

/// Pre-formatted pricing for one plan card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSummary {
    pub price: String,
    pub period: &'static str,
    /// Per-month price, only for non-monthly periods
    pub monthly_equivalent: Option<String>,
    pub savings_percent: u32,
}

pub fn price_summary(plan: &Plan, catalog: &[Plan]) -> PriceSummary {
    let non_monthly = plan.billing_period != BillingPeriod::Monthly;

    PriceSummary {
        price: format_price(plan.price),
        period: plan.billing_period.display_name(),
        monthly_equivalent: non_monthly.then(|| format_price(monthly_equivalent(plan))),
        savings_percent: if non_monthly {
            savings_percent(plan, base_monthly_price(catalog, &plan.product))
        } else {
            0
        },
    }
}

/// Last day covered by a trial starting on `start`.
///
/// A missing unit means days. Unlimited and zero-length trials have no end.
pub fn trial_end_date(start: NaiveDate, length: u32, unit: Option<TrialTimeUnit>) -> Option<NaiveDate> {
    if length == 0 {
        return None;
    }
    match unit.unwrap_or(TrialTimeUnit::Days) {
        TrialTimeUnit::Days => start.checked_add_days(Days::new(u64::from(length))),
        TrialTimeUnit::Weeks => start.checked_add_days(Days::new(u64::from(length) * 7)),
        TrialTimeUnit::Months => start.checked_add_months(Months::new(length)),
        TrialTimeUnit::Years => start.checked_add_months(Months::new(length.checked_mul(12)?)),
        TrialTimeUnit::Unlimited => None,
    }
}

/// Short trial label such as "14-day" or "1-month".
pub fn trial_label(length: u32, unit: Option<TrialTimeUnit>) -> String {
    let unit = match unit.unwrap_or(TrialTimeUnit::Days) {
        TrialTimeUnit::Days => "day",
        TrialTimeUnit::Weeks => "week",
        TrialTimeUnit::Months => "month",
        TrialTimeUnit::Years => "year",
        TrialTimeUnit::Unlimited => return "unlimited".to_string(),
    };
    format!("{}-{}", length, unit)
}
