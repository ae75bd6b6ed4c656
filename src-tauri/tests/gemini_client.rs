//! Tests for the Gemini colorization client against a mock server

use mockito::Matcher;
use pastel_artisan_lib::{ClientError, ColorizationClient, GeminiClient};

const MODEL: &str = "gemini-2.5-flash-image-preview";
const ENDPOINT: &str = "/models/gemini-2.5-flash-image-preview:generateContent";

fn client_for(server: &mockito::Server) -> GeminiClient {
    GeminiClient::new(Some("test-key".to_string()), MODEL, server.url())
}

#[tokio::test]
async fn test_returns_first_image_part() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", ENDPOINT)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJsonString(
            r#"{"contents":[{"parts":[
                {"inlineData":{"mimeType":"image/png","data":"bGluZXM="}},
                {"text":"paint it pink"}
            ]}]}"#
                .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is the colored version."},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORtest"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#,
        )
        .create_async()
        .await;

    let result = client_for(&server)
        .colorize("bGluZXM=", "image/png", "paint it pink")
        .await;

    mock.assert_async().await;
    assert_eq!(result.unwrap().as_deref(), Some("iVBORtest"));
}

#[tokio::test]
async fn test_text_only_response_is_empty_not_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"I can't draw that."}]}}]}"#)
        .create_async()
        .await;

    let result = client_for(&server)
        .colorize("bGluZXM=", "image/png", "paint")
        .await;

    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_service_error_carries_service_message() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .create_async()
        .await;

    let err = client_for(&server)
        .colorize("bGluZXM=", "image/png", "paint")
        .await
        .unwrap_err();

    match &err {
        ClientError::Service { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("Expected service error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "quota exceeded");
}

#[tokio::test]
async fn test_auth_error_without_json_body_uses_status() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let err = client_for(&server)
        .colorize("bGluZXM=", "image/png", "paint")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Service responded with 403 Forbidden");
}

#[tokio::test]
async fn test_malformed_success_body_is_hard_failure() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client_for(&server)
        .colorize("bGluZXM=", "image/png", "paint")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_connection_error_is_transport_failure() {
    // Nothing listens on the discard port
    let client = GeminiClient::new(Some("test-key".to_string()), MODEL, "http://127.0.0.1:9");

    let err = client
        .colorize("bGluZXM=", "image/png", "paint")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.to_string().starts_with("Request failed"));
}
