use newsprobe::analysis::{AnalysisError, Analyzer, ChatCompletionsAnalyzer, OllamaAnalyzer};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

#[tokio::test]
async fn chat_completions_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(serde_json::json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Bias Score: 4" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = ChatCompletionsAnalyzer::new(
        &format!("{}/api/v1/chat/completions", server.uri()),
        "test-model",
        Some("secret".into()),
    )
    .unwrap();

    let out = analyzer.analyze("The council voted on Tuesday.").await.unwrap();
    assert_eq!(out, "Bias Score: 4");
}

#[tokio::test]
async fn chat_completions_error_keeps_status_and_truncated_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(2000)))
        .mount(&server)
        .await;

    let analyzer = ChatCompletionsAnalyzer::new(&server.uri(), "m", None).unwrap();
    let err = analyzer.analyze("text").await.unwrap_err();

    match err {
        AnalysisError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body.chars().count(), 500);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn chat_completions_without_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let analyzer = ChatCompletionsAnalyzer::new(&server.uri(), "m", None).unwrap();
    let err = analyzer.analyze("text").await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
async fn ollama_generate_reads_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(
            serde_json::json!({ "model": "local", "stream": false }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "local",
            "response": "Factual Evidence Score: 7",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer =
        OllamaAnalyzer::new(&format!("{}/api/generate", server.uri()), "local").unwrap();
    let out = analyzer.analyze("Some article text.").await.unwrap();
    assert_eq!(out, "Factual Evidence Score: 7");
}

#[tokio::test]
async fn empty_text_is_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let analyzer = OllamaAnalyzer::new(&server.uri(), "local").unwrap();
    assert!(matches!(
        analyzer.analyze("   ").await,
        Err(AnalysisError::EmptyText)
    ));
}
