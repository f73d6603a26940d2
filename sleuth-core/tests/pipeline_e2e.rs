//! End-to-end tests for the research pipeline.
//!
//! These exercise a full run against a real snippet store and an
//! OpenAI-compatible provider served by a local mock HTTP server.

use pretty_assertions::assert_eq;
use sleuth_core::brain::explanation_prompt;
use sleuth_core::config::{LlmConfig, Secrets};
use sleuth_core::providers::create_provider;
use sleuth_core::{
    CannedMemory, CannedText, Collaborators, ExecutionMode, MockLlmProvider, ResearchPipeline,
    SnippetStore, format_recalled,
};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn canned(llm: Arc<dyn sleuth_core::LlmProvider>) -> Collaborators {
    Collaborators {
        memory: Arc::new(CannedMemory::default()),
        search: Arc::new(CannedText::new("raw search text")),
        llm,
        summarizer: Arc::new(CannedText::new("S")),
        repos: Arc::new(CannedText::new("R")),
    }
}

#[tokio::test]
async fn test_quantum_computing_report_text() {
    let llm = Arc::new(MockLlmProvider::with_response("E"));
    let pipeline = ResearchPipeline::new(canned(llm), 3);

    let run = pipeline.run("quantum computing").await.unwrap();

    assert_eq!(
        run.report.render(),
        "\n\u{1F4CC} **Research Topic**\nquantum computing\n\n\u{1F4DA} **Detailed Explanation**\nE\n\n\u{1F50D} **Key Summary Points**\nS\n\n\u{1F4BB} **GitHub Projects**\nR\n"
    );
    assert!(run.recalled_memory.is_empty());
    assert_eq!(format_recalled(&run.recalled_memory), "No relevant memory found.");
}

#[tokio::test]
async fn test_run_with_snippet_store_recall() {
    let dir = TempDir::new().unwrap();
    let mut store = SnippetStore::open(dir.path().join("memory.json"), 128).unwrap();
    store.add("Borrow checker rules in Rust");
    store.add("Photosynthesis converts light into chemical energy");
    store.save().unwrap();

    let store = SnippetStore::open(dir.path().join("memory.json"), 128).unwrap();
    let mut collaborators = canned(Arc::new(MockLlmProvider::with_response("E")));
    collaborators.memory = Arc::new(store);
    let pipeline = ResearchPipeline::new(collaborators, 1);

    let run = pipeline.run("rust borrow checker").await.unwrap();
    assert_eq!(run.recalled_memory, vec!["Borrow checker rules in Rust"]);
    assert!(!run.report.render().contains("Borrow checker rules"));
}

#[tokio::test]
async fn test_run_against_openai_compatible_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4",
            "messages": [{ "role": "user", "content": explanation_prompt("tide pools") }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Tide pools are small." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        base_url: server.uri(),
        ..LlmConfig::default()
    };
    let secrets = Secrets::from_pairs([("OPENAI_API_KEY", "sk-test")]);
    let provider = create_provider(&config, &secrets).unwrap();

    let pipeline =
        ResearchPipeline::new(canned(provider), 3).with_mode(ExecutionMode::Concurrent);
    let run = pipeline.run("tide pools").await.unwrap();
    assert_eq!(run.report.explanation, "Tide pools are small.");
    assert_eq!(run.report.summary, "S");
}

#[tokio::test]
async fn test_provider_auth_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let config = LlmConfig {
        base_url: server.uri(),
        ..LlmConfig::default()
    };
    let secrets = Secrets::from_pairs([("OPENAI_API_KEY", "sk-wrong")]);
    let provider = create_provider(&config, &secrets).unwrap();

    let err = ResearchPipeline::new(canned(provider), 3)
        .run("anything")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Authentication failed for OpenAI"));
}

#[test]
fn test_create_provider_requires_api_key() {
    let err = create_provider(&LlmConfig::default(), &Secrets::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}
