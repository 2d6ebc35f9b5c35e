//! AI-generated starter tasks via the Gemini `generateContent` API.

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::Priority;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const SUGGESTION_COUNT: usize = 5;

/// A candidate task proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Anything that can turn a project description into candidate tasks.
pub trait TaskSuggester: Send + Sync {
    fn suggest(&self, description: &str) -> Result<Vec<Suggestion>>;
}

pub fn build_prompt(description: &str) -> String {
    format!(
        "Based on this project description: \"{description}\", generate a list of \
         {SUGGESTION_COUNT} essential starter tasks. For each task, provide a title, a brief \
         description, and a suggested priority (Low, Medium, High, Urgent)."
    )
}

/// JSON schema the model is asked to follow.
pub fn response_schema() -> Value {
    let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "description": { "type": "STRING" },
                "priority": { "type": "STRING", "enum": priorities }
            },
            "required": ["title", "description", "priority"]
        }
    })
}

#[derive(Debug, Deserialize)]
struct Candidate {
    title: String,
    #[serde(default)]
    description: String,
    priority: String,
}

/// Parse the model's JSON answer. Candidates whose priority is outside the
/// closed set or whose title is blank are dropped; at most
/// [`SUGGESTION_COUNT`] are kept.
pub fn parse_suggestions(text: &str) -> Result<Vec<Suggestion>> {
    let candidates: Vec<Candidate> =
        serde_json::from_str(text).context("model response is not a JSON array of tasks")?;
    let mut out = Vec::with_capacity(candidates.len().min(SUGGESTION_COUNT));
    for c in candidates {
        if c.title.trim().is_empty() {
            warn!("dropping suggestion with blank title");
            continue;
        }
        let priority = match Priority::parse(&c.priority) {
            Ok(p) => p,
            Err(e) => {
                warn!("dropping suggestion '{}': {e}", c.title);
                continue;
            }
        };
        out.push(Suggestion {
            title: c.title,
            description: c.description,
            priority,
        });
        if out.len() == SUGGESTION_COUNT {
            break;
        }
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Pull the generated text out of a raw `generateContent` response body.
fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).context("unexpected response from Gemini")?;
    if let Some(err) = parsed.error {
        bail!("Gemini API error: {}", err.message);
    }
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        bail!("Gemini response contained no text");
    }
    Ok(text)
}

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            bail!("no Gemini API key: set GEMINI_API_KEY or pass --api-key");
        }
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl TaskSuggester for GeminiClient {
    fn suggest(&self, description: &str) -> Result<Vec<Suggestion>> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: build_prompt(description),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        debug!("requesting suggestions from {}", self.config.model);
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .context("request to Gemini failed")?;

        let status = response.status();
        let text = response.text().context("failed to read Gemini response")?;
        if !status.is_success() {
            bail!("Gemini returned HTTP {status}: {text}");
        }

        parse_suggestions(&extract_text(&text)?)
    }
}
