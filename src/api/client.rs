use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::PortalBackend;
use crate::config::Config;
use crate::error::{PortalError, PortalErrorCode, Result, map_status_to_error_code};
use crate::models::{
    ActionResponse, CreateInstanceResponse, InstanceAction, InstanceSummary, Plan, PlansResponse,
    ProvisioningRequest, SubdomainCheckResponse, TrialEligibility,
};
use crate::session::SessionStore;

/// HTTP client for the billing and instance services.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    config: Config,
    session: Arc<dyn SessionStore>,
}

impl PortalClient {
    pub fn new(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PortalError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
            session,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.auth_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = self.authorized(request).send().await.map_err(|e| {
            tracing::error!(error = %e, request = what, "Backend request failed");
            PortalError::from(e)
        })?;

        if !response.status().is_success() {
            return Err(read_error(response, what).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PortalError::decode(format!("Failed to parse {} response: {}", what, e)))
    }
}

impl PortalBackend for PortalClient {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let url = self.config.endpoint("billing/plans");
        let body: PlansResponse = self.send_json(self.client.get(&url), "plans").await?;

        if !body.success {
            let message = body
                .message
                .unwrap_or_else(|| "Backend reported failure loading plans".to_string());
            return Err(PortalError::new(PortalErrorCode::ServerError, message));
        }

        tracing::debug!(count = body.plans.len(), "Loaded plan catalog");
        Ok(body.plans)
    }

    async fn trial_eligibility(&self, customer_id: &str) -> Result<TrialEligibility> {
        let url = self.config.endpoint(&format!(
            "billing/trial-eligibility/{}",
            urlencoding::encode(customer_id)
        ));
        self.send_json(self.client.get(&url), "trial eligibility").await
    }

    async fn create_instance_with_subscription(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<CreateInstanceResponse> {
        let url = self.config.endpoint("billing/instances-with-subscription");
        let response: CreateInstanceResponse = self
            .send_json(self.client.post(&url).json(request), "create instance")
            .await?;

        tracing::info!(
            subscription_id = %response.subscription_id,
            plan = %request.plan_name,
            phase_type = request.phase_type.as_ref(),
            invoice = response.invoice.is_some(),
            "Created instance with subscription"
        );
        Ok(response)
    }

    async fn check_subdomain(&self, subdomain: &str) -> Result<SubdomainCheckResponse> {
        let url = self.config.endpoint(&format!(
            "instances/check-subdomain?subdomain={}",
            urlencoding::encode(subdomain)
        ));
        self.send_json(self.client.get(&url), "subdomain check").await
    }

    async fn instance_action(&self, instance_id: &str, action: InstanceAction) -> Result<ActionResponse> {
        let url = self.config.endpoint(&format!(
            "instances/{}/actions/{}",
            urlencoding::encode(instance_id),
            action.as_ref()
        ));
        self.send_json(self.client.post(&url), "instance action").await
    }

    async fn get_instance(&self, instance_id: &str) -> Result<InstanceSummary> {
        let url = self
            .config
            .endpoint(&format!("instances/{}", urlencoding::encode(instance_id)));
        self.send_json(self.client.get(&url), "instance status").await
    }
}

/// Turn a non-2xx response into an error carrying the backend's own message.
async fn read_error(response: Response, what: &str) -> PortalError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = backend_error_message(&body);

    tracing::error!(
        status = status,
        request = what,
        detail = detail.as_deref().unwrap_or(""),
        "Backend returned error"
    );

    let message = detail
        .clone()
        .unwrap_or_else(|| format!("Backend returned HTTP {} for {}", status, what));
    let mut err = PortalError::with_status(map_status_to_error_code(status), message, status);
    err.detail = detail;
    err
}

/// Extract the human-readable message from an error body.
///
/// Accepts `{"detail": "..."}`, `{"message": "..."}`, `{"error": "..."}` and the
/// list form `{"detail": [{"msg": "..."}]}` used for field validation errors.
pub(crate) fn backend_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    ["detail", "message", "error"]
        .iter()
        .find_map(|key| {
            let message = match value.get(*key)? {
                Value::String(s) => s.as_str(),
                Value::Array(items) => items.first()?.get("msg")?.as_str()?,
                _ => return None,
            };
            let message = message.trim();
            (!message.is_empty()).then(|| message.to_string())
        })
}
