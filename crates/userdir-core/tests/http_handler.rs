//! Integration tests for the reqwest-backed transport using wiremock.
//!
//! These tests run the real HTTP stack against a local mock server,
//! covering reads, retry on server errors, status classification,
//! timeouts and the JSON bodies sent on writes.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use userdir_core::api::UsersApi;
use userdir_core::config::Config;
use userdir_core::models::UserForm;
use userdir_core::transport::{ApiError, ErrorKind, ReqwestHandler, RetryPolicy, Transport};
use userdir_core::UserStore;

// =============================================================================
// Test Helpers
// =============================================================================

fn transport(server: &MockServer) -> Transport {
    let handler = ReqwestHandler::new(server.uri()).unwrap();
    Transport::new(Arc::new(handler))
        .with_timeout(Duration::from_secs(2))
        .with_retry(RetryPolicy::linear(3, Duration::from_millis(10)))
}

fn users_payload() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": { "name": "Romaguera-Crona" }
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "username": "Antonette",
            "email": "Shanna@melissa.tv",
            "company": { "name": "Deckow-Crist" }
        }
    ])
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_get_users() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let users = UsersApi::new(transport(&server)).get_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].department(), "Romaguera-Crona");
    assert_eq!(users[1].first_name(), "Ervin");
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let users = UsersApi::new(transport(&server)).get_users().await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_exhausted_server_errors_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = UsersApi::new(transport(&server)).get_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Server { .. }));
    assert_eq!(err.to_string(), "Server error occurred. Please try again later.");
}

#[tokio::test]
async fn test_not_found_is_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = UsersApi::new(transport(&server))
        .get_user_by_id(99)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
}

#[tokio::test]
async fn test_timeout_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(users_payload())
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server).with_timeout(Duration::from_millis(50));
    let err = UsersApi::new(transport).get_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout { .. }));
    assert_eq!(err.to_string(), "Request timed out. Please try again.");
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    let handler = ReqwestHandler::new("http://127.0.0.1:1").unwrap();
    let transport =
        Transport::new(Arc::new(handler)).with_retry(RetryPolicy::linear(2, Duration::ZERO));

    let err = UsersApi::new(transport).get_users().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

// =============================================================================
// Write Tests
// =============================================================================

#[tokio::test]
async fn test_create_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "name": "John Doe",
            "username": "jdoe",
            "company": { "name": "Not specified" },
            "address": { "geo": { "lat": "0", "lng": "0" } }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 11 })))
        .expect(1)
        .mount(&server)
        .await;

    let form = UserForm {
        first_name: "John".into(),
        last_name: "Doe".into(),
        username: "jdoe".into(),
        email: "john@example.com".into(),
        ..UserForm::default()
    };
    let created = UsersApi::new(transport(&server))
        .create_user(&form.to_draft())
        .await
        .unwrap();
    assert_eq!(created.id, 11);
    assert_eq!(created.email, "john@example.com");
}

#[tokio::test]
async fn test_delete_failure_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = UsersApi::new(transport(&server)).delete_user(3).await.unwrap_err();
    assert!(matches!(err, ApiError::Delete { id: 3, .. }));
    assert_eq!(err.kind(), ErrorKind::Server);
}

// =============================================================================
// Store Tests
// =============================================================================

#[tokio::test]
async fn test_store_from_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_payload()))
        .mount(&server)
        .await;

    let toml = format!(
        "[api]\nbase_url = \"{}\"\nretry_attempts = 1\nretry_delay_ms = 0\n",
        server.uri()
    );
    let config: Config = toml::from_str(&toml).unwrap();

    let mut store = UserStore::from_config(&config).unwrap();
    store.load_all().await.unwrap();
    store.apply_search("romaguera");
    assert_eq!(store.statistics().total, 2);
    assert_eq!(store.statistics().filtered, 1);
}
