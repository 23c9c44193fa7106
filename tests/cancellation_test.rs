use std::time::{Duration, Instant};

use serde_json::json;
use webreq::{AppLifetime, Error, RequestClient, RequestSettings, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(retry: RetryPolicy) -> RequestSettings {
    RequestSettings::builder()
        .force_https_scheme(false)
        .retry(retry)
        .build()
}

#[tokio::test]
async fn test_cancel_during_retry_wait_resolves_promptly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // Long backoff so the cancel lands inside the wait.
    let client = RequestClient::new(settings(RetryPolicy::new(3, [5000, 5000]))).unwrap();
    let handle = client
        .get()
        .url(format!("{}/flaky", server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let canceller = handle.canceller();
    let task = tokio::spawn(handle.send());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let start = Instant::now();
    canceller.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(err.as_cancelled().is_some());

    // No further attempt was made after the cancel.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_cancel_during_in_flight_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = RequestClient::new(settings(RetryPolicy::none())).unwrap();
    let handle = client
        .get()
        .url(format!("{}/slow", server.uri()))
        .unwrap()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap();

    let canceller = handle.canceller();
    let task = tokio::spawn(handle.send());

    tokio::time::sleep(Duration::from_millis(100)).await;
    canceller.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
}

#[tokio::test]
async fn test_shutdown_aborts_with_dedicated_kind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let lifetime = AppLifetime::new();
    let client =
        RequestClient::with_lifetime(settings(RetryPolicy::new(3, [5000])), lifetime.clone())
            .unwrap();
    let handle = client
        .get()
        .url(format!("{}/flaky", server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let task = tokio::spawn(handle.send());
    tokio::time::sleep(Duration::from_millis(100)).await;
    lifetime.shutdown();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Shutdown(_)));
    // Shutdown is not a caller cancel.
    assert!(err.as_cancelled().is_none());
}

#[tokio::test]
async fn test_pre_cancelled_handle_never_sends() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = RequestClient::new(settings(RetryPolicy::none())).unwrap();
    let handle = client
        .get()
        .url(format!("{}/anything", server.uri()))
        .unwrap()
        .build()
        .unwrap();

    handle.cancel();
    let err = handle.send().await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_timeout_is_retried_not_cancelled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_secs(10)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = RequestClient::new(settings(RetryPolicy::new(2, [10]))).unwrap();
    let err = client
        .get()
        .url(format!("{}/slow", server.uri()))
        .unwrap()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    // Timeout expiry is a transport failure, distinct from caller cancel.
    assert!(matches!(err, Error::Network(_)));
    assert!(err.as_cancelled().is_none());
}
