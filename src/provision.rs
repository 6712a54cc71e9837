//! Provisioning request assembly and submission.
//!
//! The assembler re-derives the phase type at submission time from the live
//! eligibility verdict and the selected plan; the UI toggle alone never decides
//! it. Outcomes reach the host through [`FlowEffects`].

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::api::PortalBackend;
use crate::billing::{trial_end_date, trial_label};
use crate::models::{
    CreateInstanceResponse, CurrentUser, InstanceType, Invoice, PhaseType, Plan, ProvisioningRequest,
    TrialEligibility, TrialTimeUnit,
};
use crate::scope::PageScope;
use crate::subdomain::{SubdomainStatus, normalize_subdomain};

pub const DEFAULT_ODOO_VERSION: &str = "17.0";
pub const GENERIC_FAILURE: &str = "Failed to create instance. Please try again.";

/// Where the host should take the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Instances,
    Billing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    TrialStarted {
        plan_name: String,
        trial_length: u32,
        trial_time_unit: Option<TrialTimeUnit>,
        ends_on: Option<NaiveDate>,
    },
    Success(String),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::TrialStarted {
                plan_name,
                trial_length,
                trial_time_unit,
                ends_on,
            } => match ends_on {
                Some(date) => format!(
                    "Your {} free trial of {} has started. It ends on {}.",
                    trial_label(*trial_length, *trial_time_unit),
                    plan_name,
                    date.format("%b %d, %Y")
                ),
                None => format!("Your free trial of {} has started.", plan_name),
            },
            Notice::Success(message) => message.clone(),
        }
    }
}

/// Payment step for a paid subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentModal {
    pub invoice: Invoice,
    pub subscription_id: String,
}

/// Host-side effects of the workflow (navigation, modal, notices).
pub trait FlowEffects {
    fn navigate(&mut self, route: Route);
    fn open_payment_modal(&mut self, modal: PaymentModal);
    fn notify(&mut self, notice: Notice);
}

/// Reasons a submission is refused before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("Plans are still loading")]
    CatalogNotReady,
    #[error("{0}")]
    CatalogUnavailable(String),
    #[error("Please select a plan")]
    NoPlanSelected,
    #[error("Please wait for the subdomain availability check to finish")]
    SubdomainCheckPending,
    #[error("Subdomain is not available")]
    SubdomainUnavailable,
    #[error("Please check subdomain availability first")]
    SubdomainNotChecked,
    #[error("{0}")]
    SubdomainInvalid(String),
    #[error("{0} is required")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProvisionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    TrialStarted,
    AwaitingPayment(PaymentModal),
    /// Paid subscription created without an immediate invoice
    Completed,
    Failed(String),
}

/// What one call to [`ProvisioningAssembler::submit`] ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Blocked(SubmitBlocked),
    TrialStarted(CreateInstanceResponse),
    AwaitingPayment(CreateInstanceResponse),
    Completed(CreateInstanceResponse),
    Failed(String),
    Cancelled,
}

/// User-entered instance configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceForm {
    pub name: String,
    pub description: String,
    /// Falls back to the signed-in user's email when blank
    pub admin_email: String,
    pub subdomain: String,
    /// Derived from the subdomain when blank
    pub database_name: String,
    pub odoo_version: String,
    pub instance_type: InstanceType,
    pub demo_data: bool,
    pub custom_addons: Vec<String>,
    pub phase_toggle: PhaseType,
}

impl Default for InstanceForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            admin_email: String::new(),
            subdomain: String::new(),
            database_name: String::new(),
            odoo_version: DEFAULT_ODOO_VERSION.to_string(),
            instance_type: InstanceType::default(),
            demo_data: false,
            custom_addons: Vec::new(),
            phase_toggle: PhaseType::Trial,
        }
    }
}

/// Everything the submission gate looks at besides the form itself.
#[derive(Debug, Clone, Copy)]
pub struct SubmitContext<'a> {
    pub user: &'a CurrentUser,
    pub catalog_settled: bool,
    /// Page-level load error; blocks every submission
    pub page_error: Option<&'a str>,
    pub plan: Option<&'a Plan>,
    pub eligibility: Option<&'a TrialEligibility>,
    pub subdomain: &'a SubdomainStatus,
}

/// TRIAL only when the user asked for it, trial info may be shown, and the
/// plan actually has a trial. Anything else is EVERGREEN.
pub fn resolve_phase_type(
    toggle: PhaseType,
    eligibility: Option<&TrialEligibility>,
    plan: &Plan,
) -> PhaseType {
    let can_show = eligibility.is_some_and(|e| e.can_show_trial_info);
    if toggle == PhaseType::Trial && can_show && plan.has_trial() {
        PhaseType::Trial
    } else {
        PhaseType::Evergreen
    }
}

/// Run the submission gate and return the selected plan if it passes.
pub fn validate<'a>(ctx: &SubmitContext<'a>, form: &InstanceForm) -> Result<&'a Plan, SubmitBlocked> {
    if let Some(error) = ctx.page_error {
        return Err(SubmitBlocked::CatalogUnavailable(error.to_string()));
    }
    if !ctx.catalog_settled {
        return Err(SubmitBlocked::CatalogNotReady);
    }
    let plan = ctx.plan.ok_or(SubmitBlocked::NoPlanSelected)?;

    if form.name.trim().is_empty() {
        return Err(SubmitBlocked::MissingField("Instance name"));
    }
    if form.subdomain.trim().is_empty() {
        return Err(SubmitBlocked::MissingField("Subdomain"));
    }

    let status = ctx.subdomain;
    if status.checking {
        return Err(SubmitBlocked::SubdomainCheckPending);
    }
    if let Some(error) = &status.error {
        return Err(SubmitBlocked::SubdomainInvalid(error.clone()));
    }
    match status.available {
        Some(false) => return Err(SubmitBlocked::SubdomainUnavailable),
        None => return Err(SubmitBlocked::SubdomainNotChecked),
        Some(true) => {}
    }
    if status.subdomain != normalize_subdomain(&form.subdomain) {
        return Err(SubmitBlocked::SubdomainNotChecked);
    }

    Ok(plan)
}

/// Build the request body from the form, the plan and a resolved phase.
pub fn assemble_request(
    user: &CurrentUser,
    form: &InstanceForm,
    plan: &Plan,
    phase_type: PhaseType,
) -> ProvisioningRequest {
    let subdomain = normalize_subdomain(&form.subdomain);
    let database_name = match form.database_name.trim() {
        "" => subdomain.replace('-', "_"),
        name => name.to_string(),
    };
    let admin_email = match form.admin_email.trim() {
        "" => user.email.clone(),
        email => email.to_string(),
    };

    ProvisioningRequest {
        customer_id: user.customer_id.clone(),
        plan_name: plan.name.clone(),
        name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
        admin_email,
        subdomain,
        database_name,
        odoo_version: form.odoo_version.clone(),
        instance_type: form.instance_type,
        demo_data: form.demo_data,
        cpu_limit: plan.cpu_limit,
        memory_limit: plan.memory_limit.clone(),
        storage_limit: plan.storage_limit.clone(),
        custom_addons: form.custom_addons.clone(),
        phase_type,
    }
}

/// Holds the assembler in `Submitting` for the duration of the create call.
/// If the submit future is dropped mid-call the state falls back to `Idle`, so
/// the form can be submitted again.
struct InFlight<'a> {
    state: &'a mut ProvisionState,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a mut ProvisionState) -> Self {
        *state = ProvisionState::Submitting;
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.state == ProvisionState::Submitting {
            *self.state = ProvisionState::Idle;
        }
    }
}

#[derive(Debug, Default)]
pub struct ProvisioningAssembler {
    state: ProvisionState,
    form_error: Option<String>,
}

impl ProvisioningAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ProvisionState {
        &self.state
    }

    /// Inline error under the form, if the last attempt was refused or failed.
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Validate, assemble and send the provisioning request.
    ///
    /// At most one request is sent per call; a refused submission sends none.
    pub async fn submit<B: PortalBackend>(
        &mut self,
        backend: &B,
        scope: &PageScope,
        ctx: SubmitContext<'_>,
        form: &InstanceForm,
        effects: &mut impl FlowEffects,
    ) -> SubmitOutcome {
        self.state = ProvisionState::Validating;
        self.form_error = None;

        let plan = match validate(&ctx, form) {
            Ok(plan) => plan,
            Err(blocked) => {
                self.state = ProvisionState::Idle;
                self.form_error = Some(blocked.to_string());
                return SubmitOutcome::Blocked(blocked);
            }
        };

        let phase_type = resolve_phase_type(form.phase_toggle, ctx.eligibility, plan);
        if phase_type != form.phase_toggle {
            tracing::debug!(
                plan = %plan.name,
                requested = form.phase_toggle.as_ref(),
                resolved = phase_type.as_ref(),
                "Phase type overridden at submission"
            );
        }
        let request = assemble_request(ctx.user, form, plan, phase_type);

        let in_flight = InFlight::start(&mut self.state);
        let result = scope
            .run(backend.create_instance_with_subscription(&request))
            .await;
        drop(in_flight);

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_cancelled() => {
                self.state = ProvisionState::Idle;
                return SubmitOutcome::Cancelled;
            }
            Err(e) => {
                tracing::error!(
                    customer_id = %request.customer_id,
                    plan = %request.plan_name,
                    error = %e,
                    "Instance provisioning failed"
                );
                let message = e.detail.unwrap_or_else(|| GENERIC_FAILURE.to_string());
                self.state = ProvisionState::Failed(message.clone());
                self.form_error = Some(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };

        if phase_type == PhaseType::Trial {
            effects.notify(Notice::TrialStarted {
                plan_name: plan.name.clone(),
                trial_length: plan.trial_length,
                trial_time_unit: plan.trial_time_unit,
                ends_on: trial_end_date(Utc::now().date_naive(), plan.trial_length, plan.trial_time_unit),
            });
            effects.navigate(Route::Instances);
            self.state = ProvisionState::TrialStarted;
            return SubmitOutcome::TrialStarted(response);
        }

        match &response.invoice {
            Some(invoice) => {
                let modal = PaymentModal {
                    invoice: invoice.clone(),
                    subscription_id: response.subscription_id.clone(),
                };
                effects.open_payment_modal(modal.clone());
                self.state = ProvisionState::AwaitingPayment(modal);
                SubmitOutcome::AwaitingPayment(response)
            }
            None => {
                effects.notify(Notice::Success(
                    "Instance created. Your subscription is now active.".to_string(),
                ));
                effects.navigate(Route::Billing);
                self.state = ProvisionState::Completed;
                SubmitOutcome::Completed(response)
            }
        }
    }

    /// Close the payment modal and move on to the billing page.
    ///
    /// Does nothing unless a payment modal is open.
    pub fn close_payment_modal(&mut self, effects: &mut impl FlowEffects) {
        if matches!(self.state, ProvisionState::AwaitingPayment(_)) {
            self.state = ProvisionState::Completed;
            effects.navigate(Route::Billing);
        }
    }
}
