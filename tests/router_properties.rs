//! End-to-end router behavior against a mock Gemini server.
//!
//! These tests exercise the full path: message classification, model
//! resolution, the HTTP capability layer, and response shaping.

use serde_json::json;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codeex::capabilities::GeminiCapabilities;
use codeex::config::{GeminiConfig, ModelChoice, Settings};
use codeex::router::{Router, SEARCH_USAGE, SUMMARIZE_USAGE};
use codeex::ChatTurn;

fn router_for(server: &MockServer) -> Router {
    let config = GeminiConfig {
        api_key: Some("test-key".to_string()),
        api_base: Some(server.uri()),
        ..Default::default()
    };
    let capabilities = GeminiCapabilities::new(config.clone()).unwrap();
    Router::new(std::sync::Arc::new(capabilities), config)
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    }))
}

/// Plain conversation resolves `auto` to the fast model
#[tokio::test]
async fn test_plain_chat_hits_fast_model() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(text_response("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(&[ChatTurn::user("hi there")], &Settings::default())
        .await;

    assert!(!response.is_error());
    assert_eq!(response.content(), "hello");
}

/// Slash-commands resolve `auto` to the capable model
#[tokio::test]
async fn test_solve_hits_capable_model() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .respond_with(text_response("x = 3"))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(&[ChatTurn::user("/solve 2x + 4 = 10")], &Settings::default())
        .await;

    assert_eq!(response.content(), "x = 3");
}

/// An explicit model in settings overrides automatic routing
#[tokio::test]
async fn test_explicit_model_overrides_auto() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .and(path("/models/my-model:generateContent"))
        .respond_with(text_response("summary"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        model: ModelChoice::Model("my-model".to_string()),
        ..Settings::default()
    };

    let response = router
        .generate_response(&[ChatTurn::user("/summarize some text")], &settings)
        .await;

    assert_eq!(response.content(), "summary");
}

/// Command prefixes match case-insensitively
#[tokio::test]
async fn test_case_insensitive_command_prefix() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .respond_with(text_response("solved"))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(&[ChatTurn::user("/SOLVE x = 1")], &Settings::default())
        .await;

    assert_eq!(response.content(), "solved");
}

/// A command prefix mid-message is plain conversation, not a command
#[tokio::test]
async fn test_mid_message_prefix_is_conversation() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(text_response("it searches the web"))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(
            &[ChatTurn::user("what does /search do?")],
            &Settings::default(),
        )
        .await;

    assert_eq!(response.content(), "it searches the web");
}

/// Empty /summarize and /search arguments short-circuit without a network call
#[tokio::test]
async fn test_empty_arguments_never_hit_network() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .respond_with(text_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let response = router
        .generate_response(&[ChatTurn::user("/summarize   ")], &Settings::default())
        .await;
    assert_eq!(response.content(), SUMMARIZE_USAGE);
    assert!(!response.is_error());

    let response = router
        .generate_response(&[ChatTurn::user("/search ")], &Settings::default())
        .await;
    assert_eq!(response.content(), SEARCH_USAGE);
    assert!(!response.is_error());
}

/// Search answers get citations spliced in and a source list appended
#[tokio::test]
async fn test_search_response_with_citations() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Team A won." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "http://x", "title": "X" } }
                    ],
                    "groundingSupports": [
                        { "segment": { "endIndex": 9 }, "groundingChunkIndices": [0] }
                    ]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(
            &[ChatTurn::user("/search who won the match")],
            &Settings::default(),
        )
        .await;

    assert_eq!(
        response.content(),
        "Team A wo [1](http://x)n.\n\n**Sources:**\n1. [X](http://x)"
    );
}

/// A search that yields neither text nor metadata produces the fallback
#[tokio::test]
async fn test_search_empty_answer_fallback() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(&[ChatTurn::user("/search obscure thing")], &Settings::default())
        .await;

    assert_eq!(
        response.content(),
        "I couldn't find a definitive answer to your question using web search."
    );
}

/// Backend failures are folded into an in-chat error response
#[tokio::test]
async fn test_backend_failure_becomes_error_response() {
    let server = MockServer::start().await;
    let router = router_for(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let response = router
        .generate_response(&[ChatTurn::user("hello")], &Settings::default())
        .await;

    assert!(response.is_error());
    assert_eq!(
        response.content(),
        "Sorry, I encountered an error. Please try again."
    );
}

/// A missing API key produces an error response that names the fix
#[tokio::test]
async fn test_missing_key_error_mentions_env_var() {
    let server = MockServer::start().await;
    let config = GeminiConfig {
        api_key: None,
        api_base: Some(server.uri()),
        ..Default::default()
    };
    let capabilities = GeminiCapabilities::new(config.clone()).unwrap();
    let router = Router::new(std::sync::Arc::new(capabilities), config);

    let response = router
        .generate_response(&[ChatTurn::user("hello")], &Settings::default())
        .await;

    assert!(response.is_error());
    assert!(response.content().contains("GEMINI_API_KEY"));
}
