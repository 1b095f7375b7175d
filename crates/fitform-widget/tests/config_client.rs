//! Integration tests for `ConfigClient::fetch_config`.
//!
//! Uses `wiremock` to stand up two local HTTP servers per test, one for the
//! app-proxy endpoint and one for the direct app endpoint, so the proxy
//! fallback path is exercised with real requests.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fitform_core::slug::VariantKey;
use fitform_widget::{ConfigClient, WidgetError};

const PROXY_PATH: &str = "/apps/fitform/config";
const DIRECT_PATH: &str = "/api/v1/storefront/config";

/// Builds a `ConfigClient` pointed at the two mock servers.
fn test_client(proxy: &MockServer, direct: &MockServer) -> ConfigClient {
    ConfigClient::with_base_urls(
        &format!("{}{PROXY_PATH}", proxy.uri()),
        &format!("{}{DIRECT_PATH}", direct.uri()),
        5,
    )
    .expect("failed to build test ConfigClient")
}

/// One-set config payload wrapped in the server's `{data, meta}` envelope.
fn config_envelope() -> serde_json::Value {
    json!({
        "data": {
            "sets": [{
                "id": 7,
                "name": "Custom Curtains",
                "triggerVariant": "custom-size",
                "displayStyle": "INLINE",
                "reqNearestSize": false,
                "fields": [
                    { "label": "Width (cm)", "type": "number", "required": true }
                ]
            }],
            "design": {
                "textColor": "#222222",
                "borderWidth": 2
            }
        },
        "meta": {
            "request_id": "11111111-2222-3333-4444-555555555555",
            "timestamp": "2024-07-01T00:00:00Z"
        }
    })
}

// ---------------------------------------------------------------------------
// Test 1 – happy path through the proxy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_config_sends_shop_and_variant_through_the_proxy() {
    let proxy = MockServer::start().await;
    let direct = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROXY_PATH))
        .and(query_param("shop", "demo.myshopify.com"))
        .and(query_param("variant", "custom-size,red"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&config_envelope()))
        .mount(&proxy)
        .await;

    let client = test_client(&proxy, &direct);
    let key = VariantKey::from_tokens(["Red", "Custom Size"]);
    let result = client.fetch_config("demo.myshopify.com", &key).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let config = result.unwrap();
    assert_eq!(config.sets.len(), 1, "expected the matched set");
    assert_eq!(config.sets[0].name, "Custom Curtains");
    assert_eq!(config.sets[0].fields[0].label, "Width (cm)");
    assert!(config.sets[0].fields[0].is_numeric());
    let design = config.design.expect("design block present");
    assert_eq!(design.text_color, "#222222");
    assert_eq!(design.border_width, 2);

    assert!(
        direct.received_requests().await.unwrap().is_empty(),
        "direct endpoint must not be hit when the proxy answers"
    );
}

// ---------------------------------------------------------------------------
// Test 2 – proxy 404 falls back to the direct endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_config_falls_back_to_direct_when_proxy_is_missing() {
    let proxy = MockServer::start().await;
    let direct = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROXY_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&proxy)
        .await;

    Mock::given(method("GET"))
        .and(path(DIRECT_PATH))
        .and(query_param("shop", "demo.myshopify.com"))
        .and(query_param("variant", "custom-size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&config_envelope()))
        .mount(&direct)
        .await;

    let client = test_client(&proxy, &direct);
    let key = VariantKey::parse("custom-size");
    let result = client.fetch_config("demo.myshopify.com", &key).await;

    assert!(result.is_ok(), "expected Ok via fallback, got: {result:?}");
    assert_eq!(proxy.received_requests().await.unwrap().len(), 1);
    assert_eq!(direct.received_requests().await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test 3 – non-404 proxy errors do not trigger the fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_config_does_not_fall_back_on_server_errors() {
    let proxy = MockServer::start().await;
    let direct = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROXY_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&proxy)
        .await;

    let client = test_client(&proxy, &direct);
    let key = VariantKey::parse("custom-size");
    let result = client.fetch_config("demo.myshopify.com", &key).await;

    match result.unwrap_err() {
        WidgetError::UnexpectedStatus { status, .. } => assert_eq!(status, 503),
        other => panic!("expected WidgetError::UnexpectedStatus, got: {other:?}"),
    }
    assert!(
        direct.received_requests().await.unwrap().is_empty(),
        "only a 404 means the proxy route is unwired"
    );
}

// ---------------------------------------------------------------------------
// Test 4 – 404 on both endpoints is NotFound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_config_reports_not_found_when_both_endpoints_404() {
    let proxy = MockServer::start().await;
    let direct = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROXY_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&proxy)
        .await;

    Mock::given(method("GET"))
        .and(path(DIRECT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&direct)
        .await;

    let client = test_client(&proxy, &direct);
    let key = VariantKey::parse("custom-size");
    let result = client.fetch_config("demo.myshopify.com", &key).await;

    assert!(
        matches!(result.unwrap_err(), WidgetError::NotFound { .. }),
        "expected WidgetError::NotFound"
    );
}

// ---------------------------------------------------------------------------
// Test 5 – empty match list parses to an empty config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_config_accepts_an_empty_match_list() {
    let proxy = MockServer::start().await;
    let direct = MockServer::start().await;

    let body = json!({
        "data": { "sets": [], "design": null },
        "meta": {
            "request_id": "11111111-2222-3333-4444-555555555555",
            "timestamp": "2024-07-01T00:00:00Z"
        }
    });
    Mock::given(method("GET"))
        .and(path(PROXY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&proxy)
        .await;

    let client = test_client(&proxy, &direct);
    let key = VariantKey::parse("large");
    let config = client
        .fetch_config("demo.myshopify.com", &key)
        .await
        .expect("empty match list is a normal response");

    assert!(config.sets.is_empty());
    assert!(config.design.is_none());
}

// ---------------------------------------------------------------------------
// Test 6 – malformed JSON propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_config_propagates_malformed_json_error() {
    let proxy = MockServer::start().await;
    let direct = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROXY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&proxy)
        .await;

    let client = test_client(&proxy, &direct);
    let key = VariantKey::parse("custom-size");
    let result = client.fetch_config("demo.myshopify.com", &key).await;

    assert!(
        matches!(result.unwrap_err(), WidgetError::Deserialize { .. }),
        "expected WidgetError::Deserialize"
    );
}
