//! Plan catalog loading: plans and the caller's trial verdict.

use tokio::sync::watch;

use crate::api::PortalBackend;
use crate::models::{CurrentUser, DisplayPlan, Plan, SYSTEM_ERROR_REASON, TrialEligibility};
use crate::scope::PageScope;
use crate::trial::to_display_plans;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

/// Page-local catalog state. The two slots are filled independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    pub plans: LoadState<Vec<Plan>>,
    /// `None` until the eligibility lookup has settled (it never fails)
    pub eligibility: Option<TrialEligibility>,
}

impl CatalogState {
    /// Both fetches are done, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(self.plans, LoadState::Loading) && self.eligibility.is_some()
    }

    /// Plans, or an empty slice while loading or after a failure.
    pub fn plans(&self) -> &[Plan] {
        match &self.plans {
            LoadState::Loaded(plans) => plans,
            _ => &[],
        }
    }

    /// Page-level banner text when the catalog could not be loaded.
    pub fn page_error(&self) -> Option<&str> {
        match &self.plans {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn display_plans(&self) -> Vec<DisplayPlan> {
        to_display_plans(self.plans(), self.eligibility.as_ref())
    }

    pub fn find_plan(&self, name: &str) -> Option<&Plan> {
        self.plans().iter().find(|p| p.name == name)
    }
}

/// Look up the caller's trial verdict, failing closed on any error.
pub async fn fetch_eligibility<B: PortalBackend>(backend: &B, customer_id: &str) -> TrialEligibility {
    match backend.trial_eligibility(customer_id).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(
                customer_id = %customer_id,
                error = %e,
                reason = SYSTEM_ERROR_REASON,
                "Trial eligibility lookup failed, treating customer as ineligible"
            );
            TrialEligibility::fail_closed()
        }
    }
}

/// Fetch plans and eligibility concurrently, publishing each into `state` as
/// soon as it settles.
///
/// A plan failure becomes the page error. An eligibility failure becomes the
/// fail-closed verdict. If `scope` is cancelled the unfinished slot is left
/// untouched.
pub async fn load_catalog<B: PortalBackend>(
    backend: &B,
    user: &CurrentUser,
    scope: &PageScope,
    state: &watch::Sender<CatalogState>,
) -> CatalogState {
    let plans = async {
        match scope.run(backend.list_plans()).await {
            Ok(plans) => state.send_modify(|s| s.plans = LoadState::Loaded(plans)),
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to load plans");
                let message = e.detail.unwrap_or_else(|| "Failed to load plans".to_string());
                state.send_modify(|s| s.plans = LoadState::Failed(message));
            }
        }
    };

    let eligibility = async {
        let verdict = scope
            .run(async { Ok(fetch_eligibility(backend, &user.customer_id).await) })
            .await;
        if let Ok(verdict) = verdict {
            state.send_modify(|s| s.eligibility = Some(verdict));
        }
    };

    tokio::join!(plans, eligibility);

    state.borrow().clone()
}
