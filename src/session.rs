//! Session storage for the auth token.
//!
//! The auth module owns login and writes the token here; the API client only
//! reads it. Storage is ephemeral and lives as long as the host session.

use std::collections::HashMap;
use std::sync::RwLock;

pub mod keys {
    pub const AUTH_TOKEN: &str = "portal:auth_token";
}

/// Host-provided key/value session storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    /// Bearer token for backend calls. Blank tokens count as signed out.
    fn auth_token(&self) -> Option<String> {
        self.get(keys::AUTH_TOKEN).filter(|t| !t.trim().is_empty())
    }
}

/// Process-local session used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let session = Self::default();
        session.set(keys::AUTH_TOKEN, token);
        session
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}
