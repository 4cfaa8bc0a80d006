//! Dispatches through `ReqwestTransport` against a live local endpoint.
//!
//! An axum router bound to an ephemeral port plays the content API: it
//! records what it receives and answers per route, so the tests observe
//! exactly what went over the wire.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Redirect};
use axum::routing::any;
use rulepost_dispatch::reqwest::{ReqwestConfig, ReqwestTransport};
use rulepost_dispatch::{Dispatcher, ErrorKind, PayloadDocument, RequestConfig};
use tokio::net::TcpListener;

const LINK: &str = "http://localhost/rest/type/node/article";

#[derive(Debug, Clone)]
struct Received {
    method: Method,
    headers: HeaderMap,
    body: String,
}

type Recorder = Arc<Mutex<Vec<Received>>>;

fn record(recorder: &Recorder, method: Method, headers: HeaderMap, body: String) {
    recorder.lock().unwrap().push(Received {
        method,
        headers,
        body,
    });
}

async fn create_node(
    State(recorder): State<Recorder>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    record(&recorder, method, headers, body);
    (StatusCode::OK, r#"{"nid":[{"value":1}]}"#)
}

async fn broken(
    State(recorder): State<Recorder>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    record(&recorder, method, headers, body);
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn moved() -> Redirect {
    Redirect::temporary("/node")
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

/// Starts the fake content API and returns its base url and recorder.
async fn spawn_server() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/node", any(create_node))
        .route("/broken", any(broken))
        .route("/moved", any(moved))
        .route("/slow", any(slow))
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    (format!("http://{addr}"), recorder)
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(ReqwestTransport::new(ReqwestConfig::default()).unwrap())
}

#[tokio::test]
async fn posts_hal_document_with_auth_and_token() {
    let (base, recorder) = spawn_server().await;

    let config = RequestConfig::new(format!("{base}/node?_format=hal_json"), LINK)
        .with_credentials("editor", "secret")
        .with_api_token("csrf-token")
        .with_user_id("42")
        .with_headers("X-Trace-Id: 7f3a");

    let response = dispatcher().dispatch(&config).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"nid":[{"value":1}]}"#);

    let received = recorder.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let request = &received[0];

    assert_eq!(request.method, Method::POST);
    assert_eq!(request.headers[header::CONTENT_TYPE], "application/hal+json");
    assert_eq!(request.headers[header::ACCEPT], "application/hal+json");
    assert_eq!(request.headers["x-csrf-token"], "csrf-token");
    assert_eq!(request.headers["x-trace-id"], "7f3a");
    assert_eq!(
        request.headers[header::AUTHORIZATION],
        "Basic ZWRpdG9yOnNlY3JldA=="
    );

    let document: PayloadDocument = serde_json::from_str(&request.body).unwrap();
    assert_eq!(document.link_href(), LINK);
    assert_eq!(document.user_id(), Some("42"));
}

#[tokio::test]
async fn configured_method_is_used() {
    let (base, recorder) = spawn_server().await;

    let config = RequestConfig::new(format!("{base}/node"), LINK).with_method("patch");
    dispatcher().dispatch(&config).await.unwrap();

    let received = recorder.lock().unwrap().clone();
    assert_eq!(received[0].method, Method::PATCH);
    assert!(!received[0].headers.contains_key(header::AUTHORIZATION));
    assert!(!received[0].headers.contains_key("x-csrf-token"));
}

#[tokio::test]
async fn server_error_is_unexpected_status() {
    let (base, recorder) = spawn_server().await;

    let config = RequestConfig::new(format!("{base}/broken"), LINK);
    let error = dispatcher().dispatch(&config).await.unwrap_err();

    assert_eq!(error.kind, ErrorKind::UnexpectedStatus);
    assert_eq!(error.status, Some(500));
    assert_eq!(error.body.as_deref(), Some("database unavailable"));
    assert_eq!(recorder.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn redirects_follow_the_configured_limit() {
    let (base, recorder) = spawn_server().await;

    let followed = RequestConfig::new(format!("{base}/moved"), LINK);
    let response = dispatcher().dispatch(&followed).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(recorder.lock().unwrap().len(), 1);

    let not_followed = RequestConfig::new(format!("{base}/moved"), LINK).with_max_redirects(0);
    let error = dispatcher().dispatch(&not_followed).await.unwrap_err();
    assert_eq!(error.kind, ErrorKind::UnexpectedStatus);
    assert_eq!(error.status, Some(307));
    assert_eq!(recorder.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn configured_timeout_is_honored() {
    let (base, _recorder) = spawn_server().await;

    let config = RequestConfig::new(format!("{base}/slow"), LINK).with_timeout_seconds(0.2);
    let error = dispatcher().dispatch(&config).await.unwrap_err();

    assert_eq!(error.kind, ErrorKind::Transport);
    assert!(error.to_string().contains("timed out"));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = RequestConfig::new(format!("http://{addr}/node"), LINK);
    let error = dispatcher().dispatch(&config).await.unwrap_err();

    assert_eq!(error.kind, ErrorKind::Transport);
}
