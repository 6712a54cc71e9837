use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Whether a new subscription starts in a free trial or is billed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PhaseType {
    Trial,
    #[default]
    Evergreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InstanceType {
    Development,
    Staging,
    #[default]
    Production,
}

/// Payload of `POST /billing/instances-with-subscription`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    pub customer_id: String,
    pub plan_name: String,
    pub name: String,
    pub description: String,
    pub admin_email: String,
    pub subdomain: String,
    pub database_name: String,
    pub odoo_version: String,
    pub instance_type: InstanceType,
    pub demo_data: bool,
    pub cpu_limit: f64,
    pub memory_limit: String,
    pub storage_limit: String,
    pub custom_addons: Vec<String>,
    pub phase_type: PhaseType,
}

/// Response of `GET /instances/check-subdomain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainCheckResponse {
    pub available: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InstanceAction {
    Start,
    Stop,
    Restart,
    Backup,
}

impl InstanceAction {
    /// Status the instance settles in once the action has completed.
    pub fn target_status(&self) -> InstanceStatus {
        match self {
            InstanceAction::Stop => InstanceStatus::Stopped,
            InstanceAction::Start | InstanceAction::Restart | InstanceAction::Backup => {
                InstanceStatus::Running
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InstanceStatus {
    Creating,
    Starting,
    Running,
    Stopping,
    Stopped,
    Restarting,
    Updating,
    Maintenance,
    Error,
    Terminated,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub id: String,
    pub name: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Response of `POST /instances/{id}/actions/{action}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
