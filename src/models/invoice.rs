use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invoice returned when a paid subscription needs an immediate payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(alias = "invoice_id")]
    pub id: String,
    #[serde(alias = "amount", alias = "balance")]
    pub amount_due: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Response of `POST /billing/instances-with-subscription`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInstanceResponse {
    #[serde(default)]
    pub invoice: Option<Invoice>,
    pub subscription_id: String,
    #[serde(default)]
    pub instance_id: Option<String>,
}
