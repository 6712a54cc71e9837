//! Page-scoped cancellation.
//!
//! Every request a page starts runs under its scope; closing the page resolves
//! all of them to [`PortalErrorCode::Cancelled`](crate::error::PortalErrorCode).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{PortalError, Result};

#[derive(Debug, Clone)]
pub struct PageScope {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for PageScope {
    fn default() -> Self {
        Self::new()
    }
}

impl PageScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancelled: Arc::new(tx),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        let _ = rx.wait_for(|c| *c).await;
    }

    /// Run `fut` unless the scope is cancelled first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(PortalError::cancelled());
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(PortalError::cancelled()),
            result = fut => result,
        }
    }
}
