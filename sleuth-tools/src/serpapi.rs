//! SerpAPI web search.
//!
//! Returns the single most useful piece of text from a Google result page:
//! the answer box when there is one, then the knowledge graph, then the
//! organic result snippets.

use async_trait::async_trait;
use serde_json::Value;
use sleuth_core::collaborators::WebSearch;
use sleuth_core::config::SearchConfig;
use sleuth_core::error::CollaboratorError;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "SerpAPI";

/// Text returned when a result page has nothing usable.
pub const NO_RESULT_MESSAGE: &str = "No good search result found";

pub struct SerpApiSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    engine: String,
    google_domain: String,
    gl: String,
    hl: String,
}

impl SerpApiSearch {
    pub fn new(config: &SearchConfig, api_key: String) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            engine: config.engine.clone(),
            google_domain: config.google_domain.clone(),
            gl: config.gl.clone(),
            hl: config.hl.clone(),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Pull the answer text out of a SerpAPI response body.
pub fn extract_text(body: &Value) -> Result<String, CollaboratorError> {
    if let Some(error) = body.get("error") {
        let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        return Err(CollaboratorError::ApiRequest {
            service: SERVICE.into(),
            message,
        });
    }

    // Some engines return a list of answer boxes; the first one wins.
    let answer_box = match body.get("answer_box") {
        Some(Value::Array(boxes)) => boxes.first(),
        other => other,
    };
    if let Some(answer_box) = answer_box {
        if let Some(answer) = non_empty_str(answer_box.get("answer")) {
            return Ok(answer);
        }
        if let Some(snippet) = non_empty_str(answer_box.get("snippet")) {
            return Ok(snippet);
        }
        if let Some(word) = non_empty_str(
            answer_box
                .get("snippet_highlighted_words")
                .and_then(|w| w.get(0)),
        ) {
            return Ok(word);
        }
    }

    if let Some(description) = non_empty_str(body.pointer("/knowledge_graph/description")) {
        return Ok(description);
    }

    let snippets: Vec<String> = body
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| non_empty_str(r.get("snippet")))
                .collect()
        })
        .unwrap_or_default();
    if !snippets.is_empty() {
        return Ok(snippets.join("\n"));
    }

    Ok(NO_RESULT_MESSAGE.to_string())
}

#[async_trait]
impl WebSearch for SerpApiSearch {
    async fn run(&self, query: &str) -> Result<String, CollaboratorError> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, engine = %self.engine, "Sending search request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("engine", self.engine.as_str()),
                ("google_domain", self.google_domain.as_str()),
                ("gl", self.gl.as_str()),
                ("hl", self.hl.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(CollaboratorError::from_status(SERVICE, status, &text));
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| CollaboratorError::ResponseParse {
            service: SERVICE.into(),
            message: format!("Invalid JSON: {}", e),
        })?;
        extract_text(&json)
    }
}
