use serde::{Deserialize, Serialize};

/// The signed-in customer, passed explicitly into the page by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub customer_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl CurrentUser {
    pub fn new(customer_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
        }
    }
}
