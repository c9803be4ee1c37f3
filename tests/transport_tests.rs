//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
mod common;

use astra_rust_sdk::{
    AstraErrorCode, Client, RequestOptions, TokenFuture, TokenPersister, TokenProvider,
};
use common::{init_logging, APP_TOKEN};
use serde_json::json;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const AUTH_PATH: &str = "/api/rest/v1/auth";

// Auth endpoint handing out token-1, token-2, ... in order
async fn mount_auth(server: &MockServer) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(body_json(json!({"username": "cliff", "password": "secret"})))
        .respond_with(move |_: &Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(201).set_body_json(json!({ "authToken": format!("token-{}", n) }))
        })
        .mount(server)
        .await;
    calls
}

async fn password_client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .credentials("cliff", "secret")
        .unwrap()
        .build()
        .await
        .unwrap()
}

#[derive(Debug, Default)]
struct RecordingPersister {
    tokens: Mutex<Vec<String>>,
}

impl TokenPersister for RecordingPersister {
    fn set_token(&self, token: &str) {
        self.tokens.lock().unwrap().push(token.to_string());
    }
}

#[derive(Debug)]
struct CountingProvider {
    calls: AtomicUsize,
}

impl TokenProvider for CountingProvider {
    fn get_token(&self) -> TokenFuture {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Box::pin(async move { Ok(format!("cb-{}", n)) })
    }
}

#[tokio::test]
async fn test_reauthenticates_once_on_401() -> Result<(), Box<dyn Error>> {
    init_logging();
    let server = MockServer::start().await;
    let auth_calls = mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", "token-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", "token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let persister = Arc::new(RecordingPersister::default());
    let client = Client::builder()
        .base_url(&server.uri())?
        .credentials("cliff", "secret")?
        .token_persister(persister.clone())?
        .build()
        .await?;
    assert_eq!(client.current_token(), "token-1");

    let resp = client.get("/data", RequestOptions::new()).await?;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.data, json!({"ok": true}));
    assert_eq!(client.current_token(), "token-2");
    assert_eq!(auth_calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.authentication_count(), 2);
    assert_eq!(
        *persister.tokens.lock().unwrap(),
        vec!["token-1".to_string(), "token-2".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_replay_is_surfaced() {
    init_logging();
    let server = MockServer::start().await;
    let auth_calls = mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .expect(2)
        .mount(&server)
        .await;

    let client = password_client(&server).await;
    let err = client
        .get("/data", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::RequestFailed);
    assert!(err.is_status(401));
    assert_eq!(err.body.as_deref(), Some("nope"));
    // one at build, exactly one retry
    assert_eq!(auth_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_application_token_never_reauthenticates() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"authToken": "x"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("authorization", format!("Bearer {}", APP_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::app_client(&server).await;
    let err = client
        .get("/data", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_status(401));

    // authenticate() is a no-op for application tokens
    client.authenticate().await.unwrap();
    assert_eq!(client.authentication_count(), 0);
    assert_eq!(client.current_token(), APP_TOKEN);
}

#[tokio::test]
async fn test_auto_reconnect_disabled() {
    init_logging();
    let server = MockServer::start().await;
    let auth_calls = mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .credentials("cliff", "secret")
        .unwrap()
        .auto_reconnect(false)
        .unwrap()
        .build()
        .await
        .unwrap();
    let err = client
        .get("/data", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_status(401));
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_token_without_refresh_source() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", "cached"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .auth_token("cached")
        .unwrap()
        .build()
        .await
        .unwrap();
    let err = client
        .get("/data", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::AuthenticationFailure);
}

#[tokio::test]
async fn test_token_provider() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", "cb-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", "cb-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [1, 2]})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
    });
    let client = Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .token_provider(provider.clone())
        .unwrap()
        .build()
        .await
        .unwrap();
    let resp = client.get("/data", RequestOptions::new()).await.unwrap();
    assert_eq!(resp.data, json!([1, 2]));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_timeout_is_not_retried() {
    init_logging();
    let server = MockServer::start().await;
    let auth_calls = mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {}}))
                .set_delay(Duration::from_millis(1000)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = password_client(&server).await;
    let err = client
        .get(
            "/slow",
            RequestOptions::new().timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::RequestTimeout);
    assert!(err.is_request_error());
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_request_headers_and_params() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/things/1"))
        .and(header_exists("x-requested-with"))
        .and(header_exists("user-agent"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(query_param("page-size", "5"))
        .and(body_json(json!({"a": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"x": {"a": 1}},
            "pageState": "next",
            "count": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::app_client(&server).await;
    let resp = client
        .patch(
            "things/1",
            json!({"a": 1}),
            RequestOptions::new().param("page-size", "5"),
        )
        .await
        .unwrap();
    assert_eq!(resp.data, json!({"x": {"a": 1}}));
    assert_eq!(resp.page_state.as_deref(), Some("next"));
    assert_eq!(resp.count, Some(1));
}

#[tokio::test]
async fn test_custom_auth_header() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", APP_TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .application_token(APP_TOKEN)
        .unwrap()
        .auth_header_name("X-Cassandra-Token")
        .unwrap()
        .build()
        .await
        .unwrap();
    let resp = client.get("/data", RequestOptions::new()).await.unwrap();
    assert_eq!(resp.status, 204);
    assert!(resp.data.is_null());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::app_client(&server).await;
    let err = client
        .delete("/data", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::RequestFailed);
    assert_eq!(err.status, Some(500));
    assert_eq!(err.body.as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_build_failures() {
    init_logging();
    let err = Client::builder()
        .application_token(APP_TOKEN)
        .unwrap()
        .build()
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::Configuration);

    let err = Client::builder()
        .base_url("http://localhost:8082")
        .unwrap()
        .build()
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::Configuration);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;
    let err = Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .credentials("cliff", "wrong")
        .unwrap()
        .build()
        .await
        .unwrap_err();
    assert_eq!(err.code, AstraErrorCode::AuthenticationFailure);
    assert_eq!(err.status, Some(401));
}

#[tokio::test]
async fn test_separate_auth_url() {
    init_logging();
    let data_server = MockServer::start().await;
    let auth_server = MockServer::start().await;
    let auth_calls = mount_auth(&auth_server).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("x-cassandra-token", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .expect(1)
        .mount(&data_server)
        .await;

    let client = Client::builder()
        .base_url(&data_server.uri())
        .unwrap()
        .auth_url(&format!("{}{}", auth_server.uri(), AUTH_PATH))
        .unwrap()
        .credentials("cliff", "secret")
        .unwrap()
        .build()
        .await
        .unwrap();
    let resp = client.get("/data", RequestOptions::new()).await.unwrap();
    // no data envelope: the whole body is the payload
    assert_eq!(resp.data, json!({"n": 1}));
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
}
