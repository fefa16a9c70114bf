use heatrank_classify::{AnthropicBackend, CompletionRequest, LlmBackend, LlmError, OpenAiBackend};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(json_mode: bool) -> CompletionRequest {
    CompletionRequest {
        system: Some("You classify games.".to_owned()),
        prompt: "Is XDefiant a shooter?".to_owned(),
        max_tokens: 300,
        json_mode,
    }
}

#[tokio::test]
async fn openai_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"isQualifying\": true}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend =
        OpenAiBackend::with_base_url("sk-test", "gpt-4o-mini", 5, "heatrank-test", &server.uri())
            .unwrap();
    let text = backend.complete(&request(true)).await.unwrap();
    assert_eq!(text, "{\"isQualifying\": true}");
}

#[tokio::test]
async fn openai_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend =
        OpenAiBackend::with_base_url("bad", "gpt-4o-mini", 5, "heatrank-test", &server.uri())
            .unwrap();
    let err = backend.complete(&request(false)).await.unwrap_err();
    assert!(matches!(
        err,
        LlmError::UnexpectedStatus {
            provider: "openai",
            status: 401
        }
    ));
}

#[tokio::test]
async fn openai_empty_choices_is_empty_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let backend =
        OpenAiBackend::with_base_url("sk-test", "gpt-4o-mini", 5, "heatrank-test", &server.uri())
            .unwrap();
    let err = backend.complete(&request(false)).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyCompletion("openai")));
}

#[tokio::test]
async fn anthropic_sends_version_header_and_reads_text_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{"type": "text", "text": "Yes, it is a shooter."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = AnthropicBackend::with_base_url(
        "ak-test",
        "claude-3-haiku-20240307",
        5,
        "heatrank-test",
        &server.uri(),
    )
    .unwrap();
    let text = backend.complete(&request(false)).await.unwrap();
    assert_eq!(text, "Yes, it is a shooter.");
    assert_eq!(backend.provider(), "anthropic");
}

#[tokio::test]
async fn anthropic_malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = AnthropicBackend::with_base_url(
        "ak-test",
        "claude-3-haiku-20240307",
        5,
        "heatrank-test",
        &server.uri(),
    )
    .unwrap();
    let err = backend.complete(&request(false)).await.unwrap_err();
    assert!(matches!(err, LlmError::Deserialize { .. }));
}
