use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zee_client::test_support::sse_body;
use zee_client::{Client, ZeeConfig, ZeeError};

fn test_client(server: &MockServer) -> Client<ZeeConfig> {
    Client::with_config(ZeeConfig::new().with_api_base(server.uri()))
}

#[tokio::test]
async fn list_parses_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": "gemma3:4b",
                "model": "gemma3:4b",
                "modified_at": "2025-02-11T09:12:44Z",
                "size": 3_338_801_804_u64,
                "digest": "a2af6cc3eb7f",
                "details": {"family": "gemma3", "parameter_size": "4.3B", "quantization_level": "Q4_K_M"}
            }]
        })))
        .mount(&server)
        .await;

    let models = test_client(&server).models().list().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "gemma3:4b");
    assert_eq!(models[0].details.parameter_size, "4.3B");
}

#[tokio::test]
async fn list_tolerates_null_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": null})))
        .mount(&server)
        .await;

    assert!(test_client(&server).models().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_failure_uses_fallback_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_client(&server).models().list().await.unwrap_err();
    match err {
        ZeeError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Failed to fetch models");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_encodes_model_name() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/models/gemma3%3A4b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server).models().delete("gemma3:4b").await.unwrap();
}

#[tokio::test]
async fn delete_surfaces_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "model 'x' not found"})))
        .mount(&server)
        .await;

    let err = test_client(&server).models().delete("x").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "model 'x' not found");
}

#[tokio::test]
async fn pull_streams_progress() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/models/pull"))
        .and(body_json(json!({"name": "gemma3"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[
                json!({"status": "pulling manifest"}),
                json!({"status": "downloading", "digest": "sha256:aa", "total": 100, "completed": 40}),
                json!({"status": "success"}),
            ]),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let events: Vec<_> = client.models().pull("gemma3").await.unwrap().collect().await;

    assert_eq!(events.len(), 3);
    let progress = events[1].as_ref().unwrap();
    assert_eq!(progress.completed, Some(40));
    assert_eq!(events[2].as_ref().unwrap().status, "success");
}

#[tokio::test]
async fn pull_error_payload_becomes_stream_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/models/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[
                json!({"status": "pulling manifest"}),
                json!({"error": "pull model manifest: file does not exist"}),
            ]),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let events: Vec<_> = client.models().pull("missing").await.unwrap().collect().await;

    assert!(events[0].is_ok());
    assert!(matches!(
        &events[1],
        Err(ZeeError::Stream(m)) if m == "pull model manifest: file does not exist"
    ));
}

#[tokio::test]
async fn pull_rejected_before_streaming() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/models/pull"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "name is required"})))
        .mount(&server)
        .await;

    let Err(err) = test_client(&server).models().pull("").await else {
        panic!("expected pull to be rejected");
    };
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "name is required");
}
