//! axum router for the research page.

use crate::page;
use crate::session::SessionStore;
use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use sleuth_core::config::{PageLayout, ServerConfig};
use sleuth_core::error::SleuthError;
use sleuth_core::pipeline::ResearchPipeline;
use sleuth_tools::export::export_pdf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Name of the cookie identifying a browser session.
pub const SESSION_COOKIE: &str = "sleuth_session";

/// Shared state behind every handler.
pub struct AppState {
    pipeline: ResearchPipeline,
    layout: PageLayout,
    /// Latest report per session. A new run replaces the previous one.
    sessions: Mutex<SessionStore>,
}

impl AppState {
    /// State with the default session expiry and cap.
    pub fn new(pipeline: ResearchPipeline, layout: PageLayout) -> Self {
        let defaults = ServerConfig::default();
        Self {
            pipeline,
            layout,
            sessions: Mutex::new(SessionStore::new(
                Duration::from_secs(defaults.session_ttl_secs),
                defaults.max_sessions,
            )),
        }
    }

    pub fn with_session_limits(mut self, ttl: Duration, max_sessions: usize) -> Self {
        self.sessions = Mutex::new(SessionStore::new(ttl, max_sessions));
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct RunForm {
    #[serde(default)]
    pub topic: String,
}

/// Build the router: `/`, `/run`, `/report.pdf`, and `/health`.
pub fn app_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/run", post(run_handler))
        .route("/report.pdf", get(report_pdf_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Session id from the request's cookie header, if present and well-formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(page::error_page(message))).into_response()
}

async fn index_handler() -> Html<String> {
    Html(page::form_page(None))
}

async fn run_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(form): Form<RunForm>,
) -> Response {
    if form.topic.trim().is_empty() {
        return Html(page::form_page(Some("Please enter a research topic."))).into_response();
    }

    let run = match state.pipeline.run(&form.topic).await {
        Ok(run) => run,
        Err(e) => {
            warn!(error = %e, "Research run failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let session = session_from_headers(&headers).unwrap_or_else(Uuid::new_v4);
    let max_age = {
        let mut sessions = state.sessions.lock().await;
        sessions.insert(session, run.report.clone());
        sessions.ttl().as_secs()
    };
    info!(session = %session, "Stored report");

    let cookie = format!(
        "{SESSION_COOKIE}={session}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax"
    );
    let mut response = Html(page::result_page(&form.topic, &run)).into_response();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "Could not encode session cookie"),
    }
    response
}

async fn report_pdf_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let report = match session_from_headers(&headers) {
        Some(session) => state.sessions.lock().await.get(&session).cloned(),
        None => None,
    };
    let Some(report) = report else {
        return error_response(StatusCode::NOT_FOUND, "No report yet. Run a topic first.");
    };

    let text = report.render();
    let layout = state.layout.clone();
    let file_name = layout.file_name.clone();
    let exported = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, SleuthError> {
        // Deleted when `file` drops at the end of this closure.
        let file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        export_pdf(&text, &layout, file.path())?;
        Ok(std::fs::read(file.path())?)
    })
    .await;

    let bytes = match exported {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!(error = %e, "PDF export failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
        Err(e) => {
            warn!(error = %e, "PDF export task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.session_count().await,
    }))
}

/// Serve the router on `addr` until the process is interrupted.
pub async fn run(state: SharedState, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Serving research page");
    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_headers() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_session_from_headers_rejects_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("sleuth_session=not-a-uuid"),
        );
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }
}
