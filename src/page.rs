//! The "create instance" page: catalog, plan selection, subdomain field and
//! submission wired together for one visit.
//!
//! The signed-in user is passed in by the host. Dropping the page (or calling
//! [`CreateInstancePage::close`]) cancels everything it started.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::PortalBackend;
use crate::billing::{PriceSummary, available_periods, price_summary};
use crate::catalog::{CatalogState, load_catalog};
use crate::config::Config;
use crate::models::{BillingPeriod, CurrentUser, DisplayPlan, Plan};
use crate::provision::{
    FlowEffects, InstanceForm, ProvisionState, ProvisioningAssembler, SubmitContext, SubmitOutcome,
};
use crate::scope::PageScope;
use crate::subdomain::{SubdomainChecker, SubdomainStatus};
use crate::trial::to_display_plan;

pub struct CreateInstancePage<B> {
    backend: Arc<B>,
    user: CurrentUser,
    scope: PageScope,
    catalog: watch::Sender<CatalogState>,
    subdomain: SubdomainChecker<B>,
    assembler: ProvisioningAssembler,
    selected_period: Option<BillingPeriod>,
    selected_plan: Option<String>,
    pub form: InstanceForm,
}

impl<B: PortalBackend + 'static> CreateInstancePage<B> {
    pub fn new(backend: Arc<B>, user: CurrentUser, config: &Config) -> Self {
        let (catalog, _rx) = watch::channel(CatalogState::default());
        let subdomain = SubdomainChecker::new(Arc::clone(&backend), config.subdomain_debounce);
        let form = InstanceForm {
            admin_email: user.email.clone(),
            ..InstanceForm::default()
        };

        Self {
            backend,
            user,
            scope: PageScope::new(),
            catalog,
            subdomain,
            assembler: ProvisioningAssembler::new(),
            selected_period: None,
            selected_plan: None,
            form,
        }
    }

    /// Fetch plans and trial eligibility for this visit.
    pub async fn load(&mut self) -> CatalogState {
        let state = load_catalog(self.backend.as_ref(), &self.user, &self.scope, &self.catalog).await;

        if self.selected_period.is_none() {
            self.selected_period = available_periods(state.plans()).first().copied();
        }
        state
    }

    pub fn catalog(&self) -> CatalogState {
        self.catalog.borrow().clone()
    }

    pub fn subscribe_catalog(&self) -> watch::Receiver<CatalogState> {
        self.catalog.subscribe()
    }

    pub fn billing_periods(&self) -> Vec<BillingPeriod> {
        available_periods(self.catalog.borrow().plans())
    }

    pub fn selected_period(&self) -> Option<BillingPeriod> {
        self.selected_period
    }

    /// Switch the billing period tab. Drops a plan selection that is not
    /// offered for the new period.
    pub fn select_period(&mut self, period: BillingPeriod) {
        self.selected_period = Some(period);
        let keep = self
            .selected_plan()
            .is_some_and(|plan| plan.billing_period == period);
        if !keep {
            self.selected_plan = None;
        }
    }

    /// Plans shown for the current period tab, trial info already filtered.
    pub fn display_plans(&self) -> Vec<DisplayPlan> {
        let catalog = self.catalog.borrow();
        catalog
            .display_plans()
            .into_iter()
            .filter(|dp| {
                self.selected_period
                    .is_none_or(|period| dp.plan.billing_period == period)
            })
            .collect()
    }

    pub fn price_summary(&self, plan_name: &str) -> Option<PriceSummary> {
        let catalog = self.catalog.borrow();
        let plan = catalog.find_plan(plan_name)?;
        Some(price_summary(plan, catalog.plans()))
    }

    /// Select a plan by name. Returns false if the catalog has no such plan.
    pub fn select_plan(&mut self, name: &str) -> bool {
        let period = match self.catalog.borrow().find_plan(name) {
            Some(plan) => plan.billing_period,
            None => return false,
        };
        self.selected_plan = Some(name.to_string());
        self.selected_period = Some(period);
        true
    }

    pub fn clear_plan(&mut self) {
        self.selected_plan = None;
    }

    pub fn selected_plan(&self) -> Option<Plan> {
        let name = self.selected_plan.as_deref()?;
        self.catalog.borrow().find_plan(name).cloned()
    }

    /// Whether the trial toggle should be rendered for the selected plan.
    pub fn shows_trial_toggle(&self) -> bool {
        let catalog = self.catalog.borrow();
        self.selected_plan
            .as_deref()
            .and_then(|name| catalog.find_plan(name))
            .is_some_and(|plan| to_display_plan(plan, catalog.eligibility.as_ref()).display_trial)
    }

    /// Subdomain field changed.
    pub fn set_subdomain(&mut self, raw: &str) {
        self.form.subdomain = raw.to_string();
        self.subdomain.input(raw);
    }

    pub fn subdomain_status(&self) -> SubdomainStatus {
        self.subdomain.status()
    }

    pub fn subscribe_subdomain(&self) -> watch::Receiver<SubdomainStatus> {
        self.subdomain.subscribe()
    }

    pub async fn subdomain_settled(&self) -> SubdomainStatus {
        self.subdomain.settled().await
    }

    /// Submit is enabled once both catalog fetches settled without a page
    /// error.
    pub fn can_submit(&self) -> bool {
        let catalog = self.catalog.borrow();
        catalog.is_settled() && catalog.page_error().is_none()
    }

    pub async fn submit(&mut self, effects: &mut impl FlowEffects) -> SubmitOutcome {
        let catalog = self.catalog.borrow().clone();
        let status = self.subdomain.status();
        let plan = self
            .selected_plan
            .as_deref()
            .and_then(|name| catalog.find_plan(name));

        let ctx = SubmitContext {
            user: &self.user,
            catalog_settled: catalog.is_settled(),
            page_error: catalog.page_error(),
            plan,
            eligibility: catalog.eligibility.as_ref(),
            subdomain: &status,
        };

        self.assembler
            .submit(self.backend.as_ref(), &self.scope, ctx, &self.form, effects)
            .await
    }

    pub fn close_payment_modal(&mut self, effects: &mut impl FlowEffects) {
        self.assembler.close_payment_modal(effects);
    }

    pub fn state(&self) -> &ProvisionState {
        self.assembler.state()
    }

    pub fn form_error(&self) -> Option<&str> {
        self.assembler.form_error()
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Cancel in-flight requests and pending subdomain checks.
    pub fn close(&mut self) {
        self.scope.cancel();
        self.subdomain.cancel();
    }

    /// Handle for cancelling the page from another task.
    pub fn scope(&self) -> PageScope {
        self.scope.clone()
    }
}

impl<B> Drop for CreateInstancePage<B> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
