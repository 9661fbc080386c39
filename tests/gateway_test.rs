//! End-to-end tests for the authenticated request pipeline against a
//! mock HTTP server: bearer attachment, refresh-and-retry, session
//! expiry, and error mapping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskflow_client::{
    ApiClient, ClientConfig, ClientError, MemoryTokenStore, NotificationService,
    ProjectService, RequestDescriptor, TaskService, TokenStore, UploadPayload,
};

fn client_for(server: &MockServer) -> (Arc<ApiClient>, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let client = ApiClient::new(ClientConfig::new(server.uri()), store.clone())
        .expect("client should build");
    (client, store)
}

fn unread_body(count: u64) -> serde_json::Value {
    json!({ "data": { "count": count } })
}

#[tokio::test]
async fn bearer_token_attached_to_outgoing_requests() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.set("taskflow_auth_token", "t1").unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(unread_body(3)))
        .expect(1)
        .mount(&server)
        .await;

    let count = NotificationService::new(client).unread_count().await.unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn requests_without_stored_token_carry_no_authorization() {
    let server = MockServer::start().await;
    let (client, _store) = client_for(&server);

    // Matching on the absence of the header: a mock requiring it must
    // never be hit.
    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(unread_body(0)))
        .expect(1)
        .mount(&server)
        .await;

    NotificationService::new(client).unread_count().await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_retried_once() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.store_credentials("stale", Some("r1")).unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .and(body_partial_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "accessToken": "fresh", "refreshToken": "r2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(unread_body(7)))
        .expect(1)
        .mount(&server)
        .await;

    // Caller observes only the final success
    let count = NotificationService::new(client).unread_count().await.unwrap();
    assert_eq!(count, 7);

    // Rotated pair persisted
    assert_eq!(store.access_token().unwrap().as_deref(), Some("fresh"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("r2"));
}

#[tokio::test]
async fn missing_refresh_token_clears_session_without_retry() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.set("taskflow_auth_token", "stale").unwrap();

    let expired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&expired);
    client.set_session_expired_hook(Arc::new(move || {
        flag.store(true, Ordering::SeqCst);
    }));

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = NotificationService::new(client).unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(store.access_token().unwrap().is_none());
    assert!(expired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failed_refresh_clears_session() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.store_credentials("stale", Some("r1")).unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // Refresh is invoked exactly once per originating 401, and its own
    // 401 never triggers a nested refresh.
    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "TOKEN_EXPIRED", "message": "refresh token expired" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = NotificationService::new(client).unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(store.access_token().unwrap().is_none());
    assert!(store.refresh_token().unwrap().is_none());
}

#[tokio::test]
async fn refresh_route_401_is_terminal() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.store_credentials("stale", Some("r1")).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // Hitting the refresh route through the normal pipeline must not
    // recurse into another refresh.
    let body = json!({ "refreshToken": "r1" });
    let desc = RequestDescriptor::post("/v1/auth/refresh").json(&body).unwrap();
    let err = client.execute::<serde_json::Value>(desc).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(store.access_token().unwrap().is_none());
}

#[tokio::test]
async fn structured_error_body_maps_to_api_error() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.store_credentials("t1", Some("r1")).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/projects"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": { "code": "VALIDATION_ERROR", "message": "X" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let project = taskflow_client::types::CreateProject {
        name: String::new(),
        description: None,
        color: "#2196f3".into(),
        is_public: false,
        start_date: None,
        end_date: None,
    };
    let err = ProjectService::new(client).create(&project).await.unwrap_err();
    assert_eq!(err.to_string(), "X");
    assert_eq!(err.api_code(), Some("VALIDATION_ERROR"));

    // No credential mutation on non-401 failures
    assert_eq!(store.access_token().unwrap().as_deref(), Some("t1"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("r1"));
}

#[tokio::test]
async fn unstructured_error_body_maps_to_transport_error() {
    let server = MockServer::start().await;
    let (client, _store) = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = NotificationService::new(client).unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh_call() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.store_credentials("stale", Some("r1")).unwrap();

    for route in ["/v1/notifications/unread-count", "/v1/dashboard/personal"] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
    }

    // Slow refresh keeps the flight open long enough for the second 401
    // to join it.
    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "data": { "accessToken": "fresh" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/notifications/unread-count"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(unread_body(1)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/dashboard/personal"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "totalTasks": 4,
                "completedTasks": 2,
                "overdueTasks": 0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifications = NotificationService::new(client.clone());
    let dashboard = taskflow_client::DashboardService::new(client.clone());
    let (count, stats) = tokio::join!(notifications.unread_count(), dashboard.personal());
    assert_eq!(count.unwrap(), 1);
    assert_eq!(stats.unwrap().total_tasks, 4);

    // Refresh token was not rotated by this refresh, so the stored one
    // is untouched.
    assert_eq!(store.access_token().unwrap().as_deref(), Some("fresh"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("r1"));
}

#[tokio::test]
async fn upload_goes_through_refresh_and_retry() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.store_credentials("stale", Some("r1")).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/tasks/t1/attachments"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "accessToken": "fresh" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/tasks/t1/attachments"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": "a1",
                "taskId": "t1",
                "fileName": "notes.txt",
                "fileSize": 11,
                "mimeType": "text/plain",
                "url": "https://files.example/a1",
                "uploadedBy": "u1",
                "uploadedAt": "2025-01-15T09:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let payload = UploadPayload::new("notes.txt", "text/plain", b"hello world".to_vec())
        .on_progress(Arc::new(move |pct| sink.lock().unwrap().push(pct)));

    let attachment = TaskService::new(client)
        .upload_attachment("t1", payload)
        .await
        .unwrap();
    assert_eq!(attachment.id, "a1");

    let seen = seen.lock().unwrap();
    assert_eq!(*seen.last().unwrap(), 100);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}
