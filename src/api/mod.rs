mod client;

pub use client::*;

use std::future::Future;

use crate::error::Result;
use crate::models::{
    ActionResponse, CreateInstanceResponse, InstanceAction, InstanceSummary, Plan,
    ProvisioningRequest, SubdomainCheckResponse, TrialEligibility,
};

/// The backend services the portal talks to (billing + instance APIs).
///
/// [`PortalClient`] is the HTTP implementation. Workflow code is generic over
/// this trait so it can run against any transport.
pub trait PortalBackend: Send + Sync {
    /// `GET /billing/plans`
    fn list_plans(&self) -> impl Future<Output = Result<Vec<Plan>>> + Send;

    /// `GET /billing/trial-eligibility/{customer_id}`
    fn trial_eligibility(
        &self,
        customer_id: &str,
    ) -> impl Future<Output = Result<TrialEligibility>> + Send;

    /// `POST /billing/instances-with-subscription`
    fn create_instance_with_subscription(
        &self,
        request: &ProvisioningRequest,
    ) -> impl Future<Output = Result<CreateInstanceResponse>> + Send;

    /// `GET /instances/check-subdomain?subdomain=`
    fn check_subdomain(
        &self,
        subdomain: &str,
    ) -> impl Future<Output = Result<SubdomainCheckResponse>> + Send;

    /// `POST /instances/{id}/actions/{action}`
    fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> impl Future<Output = Result<ActionResponse>> + Send;

    /// `GET /instances/{id}`
    fn get_instance(&self, instance_id: &str) -> impl Future<Output = Result<InstanceSummary>> + Send;
}
