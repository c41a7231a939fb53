//! HTTP and JSON integration tests against a local mock server.
//!
//! Covers status resolution, request options, verb shorthands, the blocking
//! variant and JSON decoding.

use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fuwu::{
    get_json, get_json_blocking, BlockingHttpClient, ClientConfig, FuwuError, HttpClient,
    HttpError, Method, RequestOptions,
};

// ─────────────────────── helpers ───────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn server_with(verb: &str, route: &str, response: ResponseTemplate) -> MockServer {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn client() -> HttpClient {
    HttpClient::new().unwrap()
}

// ═══════════════════════════════════════════════════════
// STATUS RESOLUTION
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_01_ok_resolves_success() {
    let server = server_with(
        "GET",
        "/hello",
        ResponseTemplate::new(200).set_body_string("hi"),
    )
    .await;

    let resp = client()
        .get(&format!("{}/hello", server.uri()), &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "hi");
}

#[tokio::test]
async fn test_02_not_found_resolves_failure_with_body() {
    let server = server_with(
        "GET",
        "/missing",
        ResponseTemplate::new(404).set_body_string("no such page"),
    )
    .await;

    let err = client()
        .get(&format!("{}/missing", server.uri()), &RequestOptions::new())
        .await
        .unwrap_err();
    match err {
        HttpError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such page");
        }
        other => panic!("expected status failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_03_whole_2xx_range_is_success() {
    let server = server_with("POST", "/items", ResponseTemplate::new(201)).await;

    let resp = client()
        .post(&format!("{}/items", server.uri()), &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 201);

    let server = server_with("DELETE", "/items/1", ResponseTemplate::new(204)).await;
    let resp = client()
        .delete(&format!("{}/items/1", server.uri()), &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 204);
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_04_server_error_is_not_retried() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client()
        .get(&format!("{}/flaky", server.uri()), &RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 503);
    assert_eq!(err.body(), Some("busy"));
    // `expect(1)` is verified when the server drops.
}

#[tokio::test]
async fn test_05_unreachable_host_is_transport_failure() {
    // Port 9 (discard) on localhost is not served in the test environment.
    let err = client()
        .get("http://127.0.0.1:9/", &RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Transport(_)));
    assert_eq!(err.status(), 0);
}

// ═══════════════════════════════════════════════════════
// REQUEST OPTIONS
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_06_headers_body_and_basic_auth_are_sent() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/doc"))
        .and(header("x-token", "abc"))
        // "ann:secret" in base64
        .and(header("authorization", "Basic YW5uOnNlY3JldA=="))
        .and(body_string("payload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .mount(&server)
        .await;

    let options = RequestOptions::new()
        .header("X-Token", "abc")
        .data("payload")
        .basic_auth("ann", Some("secret"));
    let resp = client()
        .put(&format!("{}/doc", server.uri()), &options)
        .await
        .unwrap();
    assert_eq!(resp.body, "stored");
}

#[tokio::test]
async fn test_07_default_headers_from_config() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cfg"))
        .and(header("user-agent", "tester/2.0"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = ClientConfig {
        user_agent: "tester/2.0".to_string(),
        default_headers: vec![("Accept".to_string(), "application/json".to_string())],
        ..ClientConfig::default()
    };
    let client = HttpClient::with_config(&config).unwrap();
    let resp = client
        .get(&format!("{}/cfg", server.uri()), &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
}

#[tokio::test]
async fn test_08_verb_shorthands_use_their_method() {
    init_tracing();
    let server = MockServer::start().await;
    for verb in ["PATCH", "OPTIONS", "HEAD"] {
        Mock::given(method(verb))
            .and(path("/verb"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let url = format!("{}/verb", server.uri());
    let c = client();
    let none = RequestOptions::new();
    assert!(c.patch(&url, &none).await.is_ok());
    assert!(c.options(&url, &none).await.is_ok());
    assert!(c.head(&url, &none).await.is_ok());
}

#[tokio::test]
async fn test_09_general_request_with_method() {
    let server = server_with(
        "GET",
        "/general",
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/plain")
            .set_body_string("ok"),
    )
    .await;

    let url = format!("{}/general", server.uri());
    let resp = client()
        .request(Method::GET, &url, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.url, url);
    assert_eq!(resp.header("Content-Type"), Some("text/plain"));
}

// ═══════════════════════════════════════════════════════
// BLOCKING VARIANT
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_10_blocking_returns_body() {
    let server = server_with(
        "GET",
        "/sync",
        ResponseTemplate::new(200).set_body_string("direct"),
    )
    .await;
    let url = format!("{}/sync", server.uri());

    let body = tokio::task::spawn_blocking(move || {
        let client = BlockingHttpClient::new().unwrap();
        client.get(&url, &RequestOptions::new())
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(body, "direct");
}

#[tokio::test]
async fn test_11_blocking_failure_keeps_status() {
    let server = server_with(
        "POST",
        "/sync",
        ResponseTemplate::new(409).set_body_string("conflict"),
    )
    .await;
    let url = format!("{}/sync", server.uri());

    let err = tokio::task::spawn_blocking(move || {
        let client = BlockingHttpClient::new().unwrap();
        client.post(&url, &RequestOptions::new().data("x"))
    })
    .await
    .unwrap()
    .unwrap_err();
    assert_eq!(err.status(), 409);
    assert_eq!(err.body(), Some("conflict"));
}

// ═══════════════════════════════════════════════════════
// JSON
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_12_json_get_decodes_object() {
    let server = server_with(
        "GET",
        "/data.json",
        ResponseTemplate::new(200).set_body_string(r#"{"a":1}"#),
    )
    .await;

    let url = format!("{}/data.json", server.uri());
    let value: Value = get_json(&client(), &url, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(value, json!({"a": 1}));
}

#[tokio::test]
async fn test_13_json_get_typed() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Item {
        id: u32,
        tags: Vec<String>,
    }

    let server = server_with(
        "GET",
        "/item",
        ResponseTemplate::new(200).set_body_json(json!({"id": 7, "tags": ["x", "y"]})),
    )
    .await;

    let url = format!("{}/item", server.uri());
    let item: Item = get_json(&client(), &url, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(
        item,
        Item {
            id: 7,
            tags: vec!["x".to_string(), "y".to_string()]
        }
    );
}

#[tokio::test]
async fn test_14_malformed_json_propagates_parse_error() {
    let server = server_with(
        "GET",
        "/bad",
        ResponseTemplate::new(200).set_body_string("{oops"),
    )
    .await;

    let result: Result<Value, _> =
        get_json(&client(), &format!("{}/bad", server.uri()), &RequestOptions::new()).await;
    assert!(matches!(result, Err(FuwuError::Json(_))));
}

#[tokio::test]
async fn test_15_json_status_failure_is_http_error() {
    let server = server_with(
        "GET",
        "/gone",
        ResponseTemplate::new(410).set_body_string("gone"),
    )
    .await;

    let result: Result<Value, _> =
        get_json(&client(), &format!("{}/gone", server.uri()), &RequestOptions::new()).await;
    match result {
        Err(FuwuError::Http(err)) => assert_eq!(err.status(), 410),
        other => panic!("expected HTTP failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_16_json_blocking() {
    let server = server_with(
        "GET",
        "/sync.json",
        ResponseTemplate::new(200).set_body_string(r#"{"ready": true}"#),
    )
    .await;
    let url = format!("{}/sync.json", server.uri());

    let value: Value = tokio::task::spawn_blocking(move || {
        let client = BlockingHttpClient::new().unwrap();
        get_json_blocking::<Value>(&client, &url, &RequestOptions::new())
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(value["ready"], json!(true));
}
