use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zee_client::directory::{refresh, spawn_poller_every};
use zee_client::{AppStore, Client, StoreAction, ZeeConfig};

fn test_client(server: &MockServer) -> Client<ZeeConfig> {
    Client::with_config(ZeeConfig::new().with_api_base(server.uri()))
}

async fn mount_directory(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "gemma3:4b", "modified_at": "2025-02-11T09:12:44Z", "size": 1},
                {"name": "llama3.2", "modified_at": "2025-02-10T09:12:44Z", "size": 2}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversations": [{
                "id": "c1", "title": "Hello", "model": "gemma3:4b",
                "created_at": "2025-03-01T10:00:00Z", "updated_at": "2025-03-01T10:00:00Z"
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn refresh_merges_into_store() {
    let server = MockServer::start().await;
    mount_directory(&server).await;

    let action = refresh(&test_client(&server)).await.unwrap();
    let mut store = AppStore::new();
    store.apply(action);

    assert_eq!(store.models().len(), 2);
    assert_eq!(store.conversations()[0].id, "c1");
    assert_eq!(store.selected_model(), Some("gemma3:4b"));
}

#[tokio::test]
async fn refresh_fails_if_either_list_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(refresh(&test_client(&server)).await.is_err());
}

#[tokio::test]
async fn poller_sends_refreshes_until_cancelled() {
    let server = MockServer::start().await;
    mount_directory(&server).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let poller = spawn_poller_every(
        test_client(&server),
        Duration::from_millis(50),
        tx,
        cancel.clone(),
    );

    for _ in 0..2 {
        let action = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(action, StoreAction::DirectoryRefreshed { .. }));
    }

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), poller)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn poller_swallows_failures() {
    // No mocks mounted: every poll gets a 404
    let server = MockServer::start().await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let poller = spawn_poller_every(
        test_client(&server),
        Duration::from_millis(20),
        tx,
        cancel.clone(),
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(rx.try_recv().is_err());
    assert!(!poller.is_finished());

    cancel.cancel();
    poller.await.unwrap();
}

#[tokio::test]
async fn poller_stops_when_receiver_dropped() {
    let server = MockServer::start().await;
    mount_directory(&server).await;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    drop(rx);
    let poller = spawn_poller_every(
        test_client(&server),
        Duration::from_millis(20),
        tx,
        CancellationToken::new(),
    );

    tokio::time::timeout(Duration::from_secs(5), poller)
        .await
        .unwrap()
        .unwrap();
}
