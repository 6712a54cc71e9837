use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API gateway (no trailing slash)
    pub api_url: String,
    /// Bearer token issued by the auth service, if already known
    pub auth_token: Option<String>,
    /// Customer the CLI acts for (the web host injects this from the profile)
    pub customer_id: Option<String>,
    /// Delay after the last keystroke before a subdomain check is sent
    pub subdomain_debounce: Duration,
    pub request_timeout: Duration,
    /// Upper bound on status polls after an instance action
    pub poll_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            auth_token: None,
            customer_id: None,
            subdomain_debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            poll_max_attempts: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_url = env::var("PORTAL_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let subdomain_debounce = env::var("PORTAL_SUBDOMAIN_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.subdomain_debounce);

        let request_timeout = env::var("PORTAL_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let poll_max_attempts: u32 = env::var("PORTAL_POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.poll_max_attempts);

        Self {
            api_url,
            auth_token: env::var("PORTAL_AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            customer_id: env::var("PORTAL_CUSTOMER_ID").ok().filter(|c| !c.is_empty()),
            subdomain_debounce,
            request_timeout,
            poll_max_attempts,
        }
    }

    /// Join an API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
