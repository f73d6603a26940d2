//! Configuration system for Sleuth.
//!
//! Two layers:
//! - **Secrets**: a plain `KEY=VALUE` file (API keys and tokens) parsed into a
//!   [`Secrets`] value object that is handed to each collaborator constructor.
//! - **Settings**: non-secret knobs loaded with `figment`: defaults -> TOML
//!   file -> `SLEUTH_`-prefixed environment variables.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default name of the settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "sleuth.toml";

/// Default name of the secrets file looked up in the working directory.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.txt";

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Credentials read from a `KEY=VALUE` file.
///
/// Blank lines are skipped. Every other line is split on its first `=`, and
/// both halves are trimmed; values may contain further `=` characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    values: BTreeMap<String, String>,
}

impl Secrets {
    /// Parse secrets from text. `source_name` is only used in error messages.
    pub fn parse(text: &str, source_name: &str) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) =
                line.split_once('=')
                    .ok_or_else(|| ConfigError::MalformedLine {
                        source_name: source_name.to_string(),
                        line: idx + 1,
                        reason: "missing '=' delimiter".into(),
                    })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::MalformedLine {
                    source_name: source_name.to_string(),
                    line: idx + 1,
                    reason: "empty key".into(),
                });
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    /// Build secrets from explicit pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a key that must be present.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Copy every pair into the process environment.
    ///
    /// # Safety
    ///
    /// Mutating the environment is only sound while no other thread reads or
    /// writes it. Call this before spawning threads (in particular before the
    /// async runtime is built).
    pub unsafe fn export_to_env(&self) {
        for (key, value) in &self.values {
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Load secrets from a file. A missing file is an error.
pub fn load_secrets(path: &Path) -> Result<Secrets, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    let secrets = Secrets::parse(&text, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), keys = secrets.len(), "Loaded secrets");
    Ok(secrets)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Top-level settings for Sleuth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleuthConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub github: GithubConfig,
    pub memory: MemoryConfig,
    pub export: PageLayout,
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
}

/// Language model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Name of the secret holding the API key.
    pub api_key_name: String,
    /// Optional cap on generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".into(),
            temperature: 0.7,
            base_url: "https://api.openai.com/v1".into(),
            api_key_name: "OPENAI_API_KEY".into(),
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

/// SerpAPI web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key_name: String,
    pub engine: String,
    pub google_domain: String,
    /// Country code.
    pub gl: String,
    /// Interface language.
    pub hl: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com".into(),
            api_key_name: "SERPAPI_API_KEY".into(),
            engine: "google".into(),
            google_domain: "google.com".into(),
            gl: "us".into(),
            hl: "en".into(),
            timeout_secs: 30,
        }
    }
}

/// GitHub repository search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub base_url: String,
    /// Name of the optional secret holding a personal access token.
    pub token_name: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".into(),
            token_name: "GITHUB_TOKEN".into(),
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

/// Memory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// JSON file backing the snippet store.
    pub path: PathBuf,
    /// Number of snippets recalled per run.
    pub k: usize,
    /// Embedding dimensionality for newly created stores.
    pub dimensions: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".sleuth/memory.json"),
            k: 3,
            dimensions: 128,
        }
    }
}

/// Fixed page geometry and captions for the exported document.
///
/// Coordinates are PDF points with the origin at the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_width: i64,
    pub page_height: i64,
    pub left_margin: i64,
    pub top_margin: i64,
    pub bottom_margin: i64,
    pub line_height: i64,
    /// Maximum characters per wrapped body line.
    pub wrap_width: usize,
    pub header_text: String,
    pub header_font_size: i64,
    /// Vertical space consumed by the header.
    pub header_advance: i64,
    /// Prefix identifying the topic line in the report text.
    pub topic_marker: String,
    /// Replacement for the marker when the topic line is drawn.
    pub topic_label: String,
    pub topic_font_size: i64,
    /// Vertical space consumed by the topic line.
    pub topic_advance: i64,
    pub body_font_size: i64,
    pub footer_text: String,
    pub footer_font_size: i64,
    pub footer_y: i64,
    /// File name offered for download.
    pub file_name: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 612,
            page_height: 792,
            left_margin: 40,
            top_margin: 40,
            bottom_margin: 40,
            line_height: 15,
            wrap_width: 110,
            header_text: "\u{1F916} AI Research Report".into(),
            header_font_size: 16,
            header_advance: 30,
            topic_marker: "\u{1F4CC}".into(),
            topic_label: "Topic:".into(),
            topic_font_size: 12,
            topic_advance: 30,
            body_font_size: 10,
            footer_text: "Generated by AI Research Assistant \u{B7} Powered by GPT-4 + LangChain"
                .into(),
            footer_font_size: 8,
            footer_y: 20,
            file_name: "AI_Research_Report.pdf".into(),
        }
    }
}

impl PageLayout {
    /// Cursor position at the top of every page.
    pub fn top(&self) -> i64 {
        self.page_height - self.top_margin
    }

    fn step(&self) -> i64 {
        self.line_height.max(1)
    }

    /// Lines that fit between `start` and the bottom margin.
    fn slots_from(&self, start: i64) -> usize {
        if start < self.bottom_margin {
            0
        } else {
            ((start - self.bottom_margin) / self.step() + 1) as usize
        }
    }

    /// Body lines per continuation page. Never zero.
    pub fn lines_per_page(&self) -> usize {
        self.slots_from(self.top()).max(1)
    }

    /// Body lines that fit on page one below the header and, when present,
    /// the topic line.
    pub fn first_page_capacity(&self, has_topic: bool) -> usize {
        let mut start = self.top() - self.header_advance;
        if has_topic {
            start -= self.topic_advance;
        }
        self.slots_from(start).min(self.lines_per_page())
    }
}

/// Web surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds a session keeps its report after the last run.
    pub session_ttl_secs: u64,
    /// Most sessions held at once; the oldest is dropped beyond this.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
            session_ttl_secs: 3600,
            max_sessions: 1000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pipeline execution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run independent collaborators as joined futures instead of one by one.
    pub concurrent: bool,
}

/// Build the layered figment for the given settings file.
fn settings_figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(SleuthConfig::default()));

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let local = Path::new(DEFAULT_SETTINGS_FILE);
            if local.exists() {
                figment = figment.merge(Toml::file(local));
            }
        }
    }

    // Environment variables (SLEUTH_LLM__MODEL, SLEUTH_SERVER__PORT, etc.)
    Ok(figment.merge(Env::prefixed("SLEUTH_").split("__")))
}

/// Load settings: defaults -> TOML file -> `SLEUTH_*` environment variables.
///
/// An explicit `path` must exist; without one, `./sleuth.toml` is used when
/// present.
pub fn load_config(path: Option<&Path>) -> Result<SleuthConfig, ConfigError> {
    settings_figment(path)?
        .extract()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}
