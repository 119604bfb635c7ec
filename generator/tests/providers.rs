//! HTTP adapter tests against a local mock server

mod common;

use std::sync::Arc;
use std::time::Duration;

use generator::{
    AnthropicChat, ChatBackend, ChatImagePromptGenerator, ChatTextGenerator, GeneratorError, ImageGenerator,
    ImagePromptGenerator, OpenAiChat, PromptTemplates, ReplicateImageGenerator, TextGenerator,
};
use serde_json::json;
use shared::ApiFailure;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{anthropic_reply, openai_reply, prediction};

#[tokio::test]
async fn test_openai_chat_extracts_content_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let chat = OpenAiChat::with_base_url("sk-test", server.uri()).unwrap();
    let response = chat.complete("system", "user", "test").await.unwrap();

    assert_eq!(response.content, "hello");
    assert_eq!(response.tokens_used, 20);
    assert_eq!(response.model_used, "gpt-4o-mini");
}

#[tokio::test]
async fn test_openai_rate_limit_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let chat = OpenAiChat::with_base_url("sk-test", server.uri()).unwrap();
    let err = chat.complete("system", "user", "test").await.unwrap_err();

    assert_eq!(err, ApiFailure::RateLimitExceeded);
}

#[tokio::test]
async fn test_anthropic_chat_sends_version_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "max_tokens": 2048, "system": "system" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("from claude")))
        .expect(1)
        .mount(&server)
        .await;

    let chat = AnthropicChat::with_base_url("ak-test", server.uri()).unwrap();
    let response = chat.complete(" system ", "user", "test").await.unwrap();

    assert_eq!(response.content, "from claude");
    assert_eq!(response.tokens_used, 20);
}

#[tokio::test]
async fn test_text_generator_over_http_applies_bold() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("## Heading\n**Hi** there")))
        .mount(&server)
        .await;

    let backend = Arc::new(OpenAiChat::with_base_url("sk-test", server.uri()).unwrap());
    let generator = ChatTextGenerator::new(backend, Arc::new(PromptTemplates::default()));

    assert_eq!(generator.generate_text("hi").await.unwrap(), "𝐇𝐢 there");
}

#[tokio::test]
async fn test_image_prompt_empty_reply_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("   ")))
        .mount(&server)
        .await;

    let backend = Arc::new(OpenAiChat::with_base_url("sk-test", server.uri()).unwrap());
    let generator = ChatImagePromptGenerator::new(backend, Arc::new(PromptTemplates::default()));

    let err = generator.generate_image_prompt("post body", "alpha").await.unwrap_err();
    assert!(matches!(err, GeneratorError::EmptyOutput { .. }));
}

#[tokio::test]
async fn test_replicate_polls_until_succeeded_and_downloads() {
    let server = MockServer::start().await;
    let poll_url = format!("{}/v1/predictions/p1", server.uri());
    let image_url = format!("{}/files/out.png", server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(header("Prefer", "wait"))
        .and(body_partial_json(json!({ "input": { "num_inference_steps": 4, "scheduler": "K_EULER" } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(prediction("processing", &poll_url, json!(null))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction("succeeded", &poll_url, json!([image_url]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/out.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![1u8, 2, 3, 4]),
        )
        .mount(&server)
        .await;

    let images = ReplicateImageGenerator::with_base_url("r8-test", server.uri())
        .unwrap()
        .with_polling(Duration::from_millis(10), 5);
    let image = images.generate_image("a quiet harbour").await.unwrap();

    assert_eq!(image.bytes, vec![1, 2, 3, 4]);
    assert_eq!(image.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_replicate_failed_prediction_surfaces_error() {
    let server = MockServer::start().await;
    let failed = json!({ "id": "p1", "status": "failed", "error": "NSFW content detected", "urls": {} });
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(failed))
        .mount(&server)
        .await;

    let images = ReplicateImageGenerator::with_base_url("r8-test", server.uri()).unwrap();
    let err = images.generate_image("prompt").await.unwrap_err();

    assert!(err.to_string().contains("NSFW content detected"));
}

#[tokio::test]
async fn test_replicate_rejects_blank_prompt() {
    let images = ReplicateImageGenerator::with_base_url("r8-test", "http://127.0.0.1:9").unwrap();
    let err = images.generate_image("  ").await.unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidInput { .. }));
}
