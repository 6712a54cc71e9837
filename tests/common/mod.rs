//! Shared fixtures: plan/eligibility builders, an in-memory backend, a
//! recording effects sink and an axum mock of the backend HTTP services.

#![allow(dead_code, unused_imports)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

pub use odoo_portal::api::PortalBackend;
pub use odoo_portal::error::{PortalError, PortalErrorCode, Result};
pub use odoo_portal::models::*;
pub use odoo_portal::provision::{FlowEffects, Notice, PaymentModal, Route};
pub use odoo_portal::subdomain::SubdomainStatus;
pub use odoo_portal::Config;

// ============ Fixtures ============

pub fn create_test_plan(name: &str, price: f64, period: BillingPeriod, trial_length: u32) -> Plan {
    Plan {
        name: name.to_string(),
        product: "odoo-standard".to_string(),
        description: Some(format!("{} plan", name)),
        price,
        billing_period: period,
        trial_length,
        trial_time_unit: (trial_length > 0).then_some(TrialTimeUnit::Days),
        cpu_limit: 1.0,
        memory_limit: "2G".to_string(),
        storage_limit: "10G".to_string(),
    }
}

/// Monthly/quarterly/annual variants of one product, trial on the monthly one.
pub fn create_test_catalog() -> Vec<Plan> {
    vec![
        create_test_plan("basic-monthly", 9.0, BillingPeriod::Monthly, 14),
        create_test_plan("basic-quarterly", 24.0, BillingPeriod::Quarterly, 0),
        create_test_plan("basic-annual", 89.0, BillingPeriod::Annual, 0),
    ]
}

pub fn eligible() -> TrialEligibility {
    TrialEligibility {
        eligible: true,
        can_show_trial_info: true,
        trial_days: 14,
        has_active_subscriptions: false,
        subscription_count: 0,
        reason: "eligible".to_string(),
    }
}

pub fn ineligible() -> TrialEligibility {
    TrialEligibility {
        eligible: false,
        can_show_trial_info: false,
        trial_days: 0,
        has_active_subscriptions: true,
        subscription_count: 2,
        reason: "has_active_subscriptions".to_string(),
    }
}

pub fn test_user() -> CurrentUser {
    CurrentUser::new("cust-42", "owner@acme.test")
}

pub fn test_invoice() -> Invoice {
    Invoice {
        id: "inv-001".to_string(),
        amount_due: 9.0,
        currency: Some("USD".to_string()),
        status: Some("COMMITTED".to_string()),
        due_date: None,
    }
}

pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.trim_end_matches('/').to_string(),
        subdomain_debounce: Duration::from_millis(20),
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

/// A subdomain status as left behind by a finished, successful check.
pub fn available_subdomain(subdomain: &str) -> SubdomainStatus {
    SubdomainStatus {
        subdomain: subdomain.to_string(),
        generation: 1,
        checking: false,
        available: Some(true),
        message: "Subdomain is available".to_string(),
        error: None,
    }
}

// ============ In-memory backend ============

/// Backend double that records every call.
pub struct FakeBackend {
    pub plans: Mutex<Result<Vec<Plan>>>,
    pub eligibility: Mutex<Result<TrialEligibility>>,
    pub create_result: Mutex<Result<CreateInstanceResponse>>,
    pub create_delay: Mutex<Duration>,
    pub taken_subdomains: Mutex<Vec<String>>,
    pub subdomain_delays: Mutex<HashMap<String, Duration>>,
    pub subdomain_error: Mutex<Option<PortalError>>,
    pub action_response: Mutex<ActionResponse>,
    pub statuses: Mutex<VecDeque<InstanceStatus>>,
    pub created: Mutex<Vec<ProvisioningRequest>>,
    pub checked: Mutex<Vec<String>>,
    pub create_calls: AtomicUsize,
    pub check_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            plans: Mutex::new(Ok(create_test_catalog())),
            eligibility: Mutex::new(Ok(eligible())),
            create_result: Mutex::new(Ok(CreateInstanceResponse {
                invoice: None,
                subscription_id: "sub-1".to_string(),
                instance_id: Some("inst-1".to_string()),
            })),
            create_delay: Mutex::new(Duration::ZERO),
            taken_subdomains: Mutex::new(vec!["taken".to_string()]),
            subdomain_delays: Mutex::new(HashMap::new()),
            subdomain_error: Mutex::new(None),
            action_response: Mutex::new(ActionResponse {
                success: true,
                message: "Action queued".to_string(),
            }),
            statuses: Mutex::new(VecDeque::new()),
            created: Mutex::new(Vec::new()),
            checked: Mutex::new(Vec::new()),
            create_calls: AtomicUsize::new(0),
            check_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eligibility(self, verdict: Result<TrialEligibility>) -> Self {
        *self.eligibility.lock().unwrap() = verdict;
        self
    }

    pub fn with_create_result(self, result: Result<CreateInstanceResponse>) -> Self {
        *self.create_result.lock().unwrap() = result;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProvisioningRequest> {
        self.created.lock().unwrap().last().cloned()
    }
}

impl PortalBackend for FakeBackend {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        self.plans.lock().unwrap().clone()
    }

    async fn trial_eligibility(&self, _customer_id: &str) -> Result<TrialEligibility> {
        self.eligibility.lock().unwrap().clone()
    }

    async fn create_instance_with_subscription(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<CreateInstanceResponse> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push(request.clone());

        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.create_result.lock().unwrap().clone()
    }

    async fn check_subdomain(&self, subdomain: &str) -> Result<SubdomainCheckResponse> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.checked.lock().unwrap().push(subdomain.to_string());

        let delay = self.subdomain_delays.lock().unwrap().get(subdomain).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let error = self.subdomain_error.lock().unwrap().clone();
        if let Some(error) = error {
            return Err(error);
        }

        let taken = self.taken_subdomains.lock().unwrap().iter().any(|t| t == subdomain);
        Ok(SubdomainCheckResponse {
            available: !taken,
            message: if taken {
                "Subdomain is already taken".to_string()
            } else {
                "Subdomain is available".to_string()
            },
        })
    }

    async fn instance_action(&self, _instance_id: &str, _action: InstanceAction) -> Result<ActionResponse> {
        Ok(self.action_response.lock().unwrap().clone())
    }

    async fn get_instance(&self, instance_id: &str) -> Result<InstanceSummary> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap_or(InstanceStatus::Unknown)
        } else {
            statuses.front().copied().unwrap_or(InstanceStatus::Unknown)
        };
        Ok(InstanceSummary {
            id: instance_id.to_string(),
            name: "Acme ERP".to_string(),
            status,
            subdomain: Some("acme".to_string()),
            error_message: (status == InstanceStatus::Error).then(|| "container crashed".to_string()),
        })
    }
}

// ============ Effects sink ============

#[derive(Debug, Default)]
pub struct RecordingEffects {
    pub routes: Vec<Route>,
    pub modals: Vec<PaymentModal>,
    pub notices: Vec<Notice>,
}

impl FlowEffects for RecordingEffects {
    fn navigate(&mut self, route: Route) {
        self.routes.push(route);
    }

    fn open_payment_modal(&mut self, modal: PaymentModal) {
        self.modals.push(modal);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

// ============ HTTP mock backend ============

/// Canned responses and captured requests for the axum mock.
#[derive(Clone)]
pub struct MockState {
    pub plans_status: StatusCode,
    pub plans_body: Value,
    pub eligibility_status: StatusCode,
    pub eligibility_body: Value,
    pub create_status: StatusCode,
    pub create_body: Value,
    pub taken_subdomains: Vec<String>,
    pub captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            plans_status: StatusCode::OK,
            plans_body: json!({ "success": true, "plans": create_test_catalog() }),
            eligibility_status: StatusCode::OK,
            eligibility_body: serde_json::to_value(eligible()).unwrap(),
            create_status: StatusCode::OK,
            create_body: json!({ "subscription_id": "sub-100", "invoice": null }),
            taken_subdomains: vec!["taken".to_string()],
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockState {
    pub fn captured(&self, path_prefix: &str) -> Vec<CapturedRequest> {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(path_prefix))
            .cloned()
            .collect()
    }

    fn capture(&self, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.captured.lock().unwrap().push(CapturedRequest {
            path,
            authorization,
            body,
        });
    }
}

async fn mock_plans(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.capture("/billing/plans".to_string(), &headers, Value::Null);
    (state.plans_status, Json(state.plans_body.clone())).into_response()
}

async fn mock_eligibility(
    State(state): State<MockState>,
    Path(customer_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.capture(
        format!("/billing/trial-eligibility/{}", customer_id),
        &headers,
        Value::Null,
    );
    (state.eligibility_status, Json(state.eligibility_body.clone())).into_response()
}

async fn mock_create(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.capture("/billing/instances-with-subscription".to_string(), &headers, body);
    (state.create_status, Json(state.create_body.clone())).into_response()
}

async fn mock_check_subdomain(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let subdomain = query.get("subdomain").cloned().unwrap_or_default();
    state.capture(
        "/instances/check-subdomain".to_string(),
        &headers,
        json!({ "subdomain": subdomain }),
    );
    let taken = state.taken_subdomains.contains(&subdomain);
    Json(json!({
        "available": !taken,
        "message": if taken { "Subdomain is already taken" } else { "Subdomain is available" },
    }))
    .into_response()
}

async fn mock_instance_action(Path((id, action)): Path<(String, String)>) -> Response {
    Json(json!({ "success": true, "message": format!("{} queued for {}", action, id) })).into_response()
}

async fn mock_get_instance(Path(id): Path<String>) -> Response {
    Json(json!({ "id": id, "name": "Acme ERP", "status": "running" })).into_response()
}

/// Serve the mock on an ephemeral port and return its base URL.
pub async fn spawn_mock_backend(state: MockState) -> String {
    let app = Router::new()
        .route("/billing/plans", get(mock_plans))
        .route("/billing/trial-eligibility/{customer_id}", get(mock_eligibility))
        .route("/billing/instances-with-subscription", post(mock_create))
        .route("/instances/check-subdomain", get(mock_check_subdomain))
        .route("/instances/{id}/actions/{action}", post(mock_instance_action))
        .route("/instances/{id}", get(mock_get_instance))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
