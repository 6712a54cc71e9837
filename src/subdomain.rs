//! Debounced subdomain availability checking.
//!
//! Every keystroke bumps the status generation and restarts the delay. A check
//! publishes its result only if its generation is still the latest, so a slow
//! response for an old input can never overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::PortalBackend;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubdomainStatus {
    /// Normalized subdomain the status refers to
    pub subdomain: String,
    /// Bumped on every input; only the matching check may publish
    pub generation: u64,
    pub checking: bool,
    /// Backend verdict, `None` until a check for this input has completed
    pub available: Option<bool>,
    pub message: String,
    /// Inline field error (bad format or failed check)
    pub error: Option<String>,
}

/// Trim and lowercase user input.
pub fn normalize_subdomain(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Local format rules, checked before anything is sent.
pub fn validate_subdomain(subdomain: &str) -> Result<(), String> {
    if subdomain.len() < MIN_LEN || subdomain.len() > MAX_LEN {
        return Err(format!(
            "Subdomain must be between {} and {} characters",
            MIN_LEN, MAX_LEN
        ));
    }
    if !subdomain
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Subdomain may only contain lowercase letters, numbers and hyphens".to_string());
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err("Subdomain cannot start or end with a hyphen".to_string());
    }
    Ok(())
}

pub struct SubdomainChecker<B> {
    backend: Arc<B>,
    debounce: Duration,
    status: Arc<watch::Sender<SubdomainStatus>>,
    pending: Option<JoinHandle<()>>,
}

impl<B: PortalBackend + 'static> SubdomainChecker<B> {
    pub fn new(backend: Arc<B>, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(SubdomainStatus::default());
        Self {
            backend,
            debounce,
            status: Arc::new(tx),
            pending: None,
        }
    }

    pub fn status(&self) -> SubdomainStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubdomainStatus> {
        self.status.subscribe()
    }

    /// Feed the latest field value. Supersedes any check still pending.
    pub fn input(&mut self, raw: &str) {
        self.abort_pending();

        let subdomain = normalize_subdomain(raw);
        let format_error = if subdomain.is_empty() {
            None
        } else {
            validate_subdomain(&subdomain).err()
        };
        let will_check = !subdomain.is_empty() && format_error.is_none();

        let mut generation = 0;
        self.status.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.subdomain = subdomain.clone();
            s.checking = will_check;
            s.available = None;
            s.message.clear();
            s.error = format_error;
        });

        if !will_check {
            return;
        }

        let backend = Arc::clone(&self.backend);
        let status = Arc::clone(&self.status);
        let debounce = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let result = backend.check_subdomain(&subdomain).await;

            let published = status.send_if_modified(|s| {
                if s.generation != generation {
                    return false;
                }
                s.checking = false;
                match &result {
                    Ok(check) => {
                        s.available = Some(check.available);
                        s.message = check.message.clone();
                    }
                    Err(e) => {
                        s.error = Some(
                            e.detail
                                .clone()
                                .unwrap_or_else(|| "Could not check subdomain availability".to_string()),
                        );
                    }
                }
                true
            });

            if !published {
                tracing::debug!(subdomain = %subdomain, generation, "Discarded stale subdomain check");
            } else if let Err(e) = result {
                tracing::warn!(subdomain = %subdomain, error = %e, "Subdomain check failed");
            }
        }));
    }

    /// Wait until no check is in flight and return the settled status.
    pub async fn settled(&self) -> SubdomainStatus {
        let mut rx = self.status.subscribe();
        match rx.wait_for(|s| !s.checking).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Abort any pending check; its result will never be published.
    pub fn cancel(&mut self) {
        self.abort_pending();
        self.status.send_if_modified(|s| {
            if !s.checking {
                return false;
            }
            s.generation += 1;
            s.checking = false;
            true
        });
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<B> Drop for SubdomainChecker<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
