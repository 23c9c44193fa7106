use serde_json::json;
use webreq::{ApiSection, RequestClient, RequestSettings, RetryPolicy};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_section_base_url_and_headers_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/users/42"))
        .and(header("x-section", "accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = RequestSettings::builder()
        .force_https_scheme(false)
        .retry(RetryPolicy::none())
        .section(
            ApiSection::new("accounts", format!("{}/v2", server.uri()))
                .with_header("X-Section", "accounts"),
        )
        .build();
    let client = RequestClient::new(settings).unwrap();

    let value = client
        .get()
        .section("accounts")
        .unwrap()
        .url("users/42")
        .unwrap()
        .build()
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(value["id"], 42);
}

#[tokio::test]
async fn test_query_params_and_timestamp_header_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("page", "2"))
        .and(header_exists("Time"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let settings = RequestSettings::builder()
        .force_https_scheme(false)
        .retry(RetryPolicy::none())
        .build();
    let client = RequestClient::new(settings).unwrap();

    client
        .get()
        .url(format!("{}/search", server.uri()))
        .unwrap()
        .param("q", "rust")
        .param("page", "2")
        .build()
        .unwrap()
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_explicit_header_overrides_default_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agent"))
        .and(header("user-agent", "custom/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = RequestSettings::builder()
        .force_https_scheme(false)
        .retry(RetryPolicy::none())
        .build();
    let client = RequestClient::new(settings).unwrap();

    client
        .get()
        .url(format!("{}/agent", server.uri()))
        .unwrap()
        .header("User-Agent", "custom/1.0")
        .build()
        .unwrap()
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_disabled_time_header_stays_off_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let settings = RequestSettings::builder()
        .force_https_scheme(false)
        .retry(RetryPolicy::none())
        .time_header(false, "Time")
        .build();
    let client = RequestClient::new(settings).unwrap();

    client
        .get()
        .url(format!("{}/plain", server.uri()))
        .unwrap()
        .build()
        .unwrap()
        .send()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("Time").is_none());
}
