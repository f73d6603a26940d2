//! Integration tests for the research page routes.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use sleuth_core::brain::MockLlmProvider;
use sleuth_core::collaborators::{CannedMemory, CannedText};
use sleuth_core::config::PageLayout;
use sleuth_core::error::CollaboratorError;
use sleuth_core::pipeline::{Collaborators, ResearchPipeline};
use sleuth_ui::{AppState, SharedState, app_router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn make_state(llm: Arc<MockLlmProvider>) -> SharedState {
    Arc::new(app_state(llm))
}

fn app_state(llm: Arc<MockLlmProvider>) -> AppState {
    let collaborators = Collaborators {
        memory: Arc::new(CannedMemory(vec!["a remembered note".into()])),
        search: Arc::new(CannedText::new("raw web text")),
        llm,
        summarizer: Arc::new(CannedText::new("- key point")),
        repos: Arc::new(CannedText::new("- [org/repo](https://github.com/org/repo)")),
    };
    AppState::new(ResearchPipeline::new(collaborators, 3), PageLayout::default())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_topic(topic: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/run")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = format!("topic={}", topic.replace(' ', "+"));
    builder.body(Body::from(body)).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 10_000_000)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `name=value` part of the Set-Cookie header.
fn session_cookie(resp: &axum::response::Response) -> String {
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_index_shows_form() {
    let app = app_router(make_state(Arc::new(MockLlmProvider::new())));
    let resp = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("AI Research Assistant"));
    assert!(html.contains("name=\"topic\""));
    assert!(html.contains("Run AI Agent"));
}

#[tokio::test]
async fn test_health() {
    let app = app_router(make_state(Arc::new(MockLlmProvider::new())));
    let resp = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_run_renders_sections_and_sets_cookie() {
    let llm = Arc::new(MockLlmProvider::with_response("A gentle explanation."));
    let app = app_router(make_state(llm.clone()));

    let resp = app
        .oneshot(post_topic("quantum computing", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).starts_with("sleuth_session="));
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=3600"), "{set_cookie}");

    let html = body_text(resp).await;
    assert!(html.contains("Recalled Memory (for context only)"));
    assert!(html.contains("a remembered note"));
    assert!(html.contains("A gentle explanation."));
    assert!(html.contains("<li>key point</li>"));
    assert!(html.contains("Final Report"));
    assert!(html.contains("/report.pdf"));
    assert_eq!(llm.prompts().len(), 1);
}

#[tokio::test]
async fn test_blank_topic_does_not_run() {
    let llm = Arc::new(MockLlmProvider::new());
    let state = make_state(llm.clone());
    let app = app_router(state.clone());

    let resp = app.oneshot(post_topic("   ", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(resp).await.contains("Please enter a research topic."));
    assert!(llm.prompts().is_empty());
    assert_eq!(state.session_count().await, 0);
}

#[tokio::test]
async fn test_collaborator_failure_is_500() {
    let llm = Arc::new(MockLlmProvider::new());
    llm.queue_error(CollaboratorError::AuthFailed {
        service: "OpenAI".into(),
    });
    let state = make_state(llm);
    let app = app_router(state.clone());

    let resp = app.oneshot(post_topic("anything", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(resp).await.contains("Authentication failed for OpenAI"));
    assert_eq!(state.session_count().await, 0);
}

#[tokio::test]
async fn test_pdf_without_session_is_404() {
    let app = app_router(make_state(Arc::new(MockLlmProvider::new())));
    let resp = app.oneshot(get("/report.pdf", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_run_then_download_pdf() {
    let state = make_state(Arc::new(MockLlmProvider::with_response("explained")));

    let resp = app_router(state.clone())
        .oneshot(post_topic("tide pools", None))
        .await
        .unwrap();
    let cookie = session_cookie(&resp);

    let resp = app_router(state.clone())
        .oneshot(get("/report.pdf", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"AI_Research_Report.pdf\""
    );
    let bytes = axum::body::to_bytes(resp.into_body(), 10_000_000)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_second_run_replaces_session_report() {
    let llm = Arc::new(MockLlmProvider::new());
    llm.queue_response("first explanation");
    llm.queue_response("second explanation");
    let state = make_state(llm);

    let resp = app_router(state.clone())
        .oneshot(post_topic("first", None))
        .await
        .unwrap();
    let cookie = session_cookie(&resp);

    let resp = app_router(state.clone())
        .oneshot(post_topic("second", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(session_cookie(&resp), cookie);
    assert_eq!(state.session_count().await, 1);
}

#[tokio::test]
async fn test_session_cap_drops_oldest_report() {
    let state = Arc::new(
        app_state(Arc::new(MockLlmProvider::with_response("explained")))
            .with_session_limits(Duration::from_secs(3600), 3),
    );

    let mut cookies = Vec::new();
    for i in 0..5 {
        let resp = app_router(state.clone())
            .oneshot(post_topic(&format!("topic {i}"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        cookies.push(session_cookie(&resp));
    }
    assert_eq!(state.session_count().await, 3);

    let resp = app_router(state.clone())
        .oneshot(get("/report.pdf", Some(&cookies[0])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app_router(state.clone())
        .oneshot(get("/report.pdf", Some(&cookies[4])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_session_has_no_report() {
    let state = Arc::new(
        app_state(Arc::new(MockLlmProvider::with_response("explained")))
            .with_session_limits(Duration::ZERO, 10),
    );

    let resp = app_router(state.clone())
        .oneshot(post_topic("tide pools", None))
        .await
        .unwrap();
    let cookie = session_cookie(&resp);
    assert_eq!(state.session_count().await, 0);

    let resp = app_router(state.clone())
        .oneshot(get("/report.pdf", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
