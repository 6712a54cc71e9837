mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use odoo_portal::subdomain::SubdomainChecker;

const DEBOUNCE: Duration = Duration::from_millis(20);

fn checker(backend: &Arc<FakeBackend>) -> SubdomainChecker<FakeBackend> {
    SubdomainChecker::new(Arc::clone(backend), DEBOUNCE)
}

#[tokio::test]
async fn test_rapid_typing_sends_one_check() {
    let backend = Arc::new(FakeBackend::new());
    let mut checker = checker(&backend);

    for value in ["acm", "acme", "acme-", "acme-e", "acme-erp"] {
        checker.input(value);
    }
    let status = checker.settled().await;

    assert_eq!(backend.check_calls(), 1);
    assert_eq!(*backend.checked.lock().unwrap(), vec!["acme-erp".to_string()]);
    assert_eq!(status.subdomain, "acme-erp");
    assert_eq!(status.available, Some(true));
    assert_eq!(status.message, "Subdomain is available");
    assert_eq!(status.error, None);
}

#[tokio::test]
async fn test_input_is_normalized_before_checking() {
    let backend = Arc::new(FakeBackend::new());
    let mut checker = checker(&backend);

    checker.input("  TAKEN ");
    let status = checker.settled().await;

    assert_eq!(*backend.checked.lock().unwrap(), vec!["taken".to_string()]);
    assert_eq!(status.available, Some(false));
    assert_eq!(status.message, "Subdomain is already taken");
}

#[tokio::test]
async fn test_stale_result_is_discarded() {
    let backend = Arc::new(FakeBackend::new());
    backend.taken_subdomains.lock().unwrap().push("slowco".to_string());
    backend
        .subdomain_delays
        .lock()
        .unwrap()
        .insert("slowco".to_string(), Duration::from_millis(200));
    let mut checker = checker(&backend);

    checker.input("slowco");
    // Let the debounce elapse so the slow request is in flight
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(checker.status().checking);

    checker.input("fastco");
    let status = checker.settled().await;
    assert_eq!(status.subdomain, "fastco");
    assert_eq!(status.available, Some(true));

    // Outlive the slow request; its verdict must never show up
    tokio::time::sleep(Duration::from_millis(300)).await;
    let status = checker.status();
    assert_eq!(status.subdomain, "fastco");
    assert_eq!(status.available, Some(true));
    assert!(!status.checking);
}

#[tokio::test]
async fn test_bad_format_never_reaches_backend() {
    let backend = Arc::new(FakeBackend::new());
    let mut checker = checker(&backend);

    checker.input("acme_erp");
    let status = checker.status();
    assert!(!status.checking);
    assert_eq!(status.available, None);
    assert_eq!(
        status.error.as_deref(),
        Some("Subdomain may only contain lowercase letters, numbers and hyphens")
    );

    checker.input("ab");
    assert_eq!(
        checker.status().error.as_deref(),
        Some("Subdomain must be between 3 and 63 characters")
    );

    tokio::time::sleep(DEBOUNCE * 4).await;
    assert_eq!(backend.check_calls(), 0);
}

#[tokio::test]
async fn test_empty_input_clears_status() {
    let backend = Arc::new(FakeBackend::new());
    let mut checker = checker(&backend);

    checker.input("acme");
    checker.settled().await;
    checker.input("   ");

    let status = checker.status();
    assert_eq!(status.subdomain, "");
    assert_eq!(status.available, None);
    assert_eq!(status.error, None);
    assert!(!status.checking);
    assert_eq!(backend.check_calls(), 1);
}

#[tokio::test]
async fn test_check_failure_shows_inline_error() {
    let backend = Arc::new(FakeBackend::new());
    let mut error = PortalError::with_status(PortalErrorCode::ServerError, "HTTP 503", 503);
    error.detail = Some("Instance service is down".to_string());
    *backend.subdomain_error.lock().unwrap() = Some(error);
    let mut checker = checker(&backend);

    checker.input("acme");
    let status = checker.settled().await;
    assert_eq!(status.available, None);
    assert_eq!(status.error.as_deref(), Some("Instance service is down"));

    *backend.subdomain_error.lock().unwrap() = Some(PortalError::network("timed out"));
    checker.input("acme-two");
    let status = checker.settled().await;
    assert_eq!(status.error.as_deref(), Some("Could not check subdomain availability"));
}

#[tokio::test]
async fn test_cancel_drops_pending_check() {
    let backend = Arc::new(FakeBackend::new());
    let mut checker = checker(&backend);

    checker.input("acme");
    assert!(checker.status().checking);
    checker.cancel();

    tokio::time::sleep(DEBOUNCE * 4).await;
    let status = checker.status();
    assert!(!status.checking);
    assert_eq!(status.available, None);
    assert_eq!(backend.check_calls(), 0);
}

#[tokio::test]
async fn test_subscribers_see_checking_then_result() {
    let backend = Arc::new(FakeBackend::new());
    let mut checker = checker(&backend);
    let mut rx = checker.subscribe();

    checker.input("acme");
    assert!(rx.borrow_and_update().checking);

    rx.changed().await.unwrap();
    let status = rx.borrow_and_update().clone();
    assert!(!status.checking);
    assert_eq!(status.available, Some(true));
}
