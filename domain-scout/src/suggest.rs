//! Base-name suggestion: turns a free-text product description into a list
//! of candidate names before any probing happens.

use async_trait::async_trait;
use domain_scout_lib::ScoutError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_COUNT: usize = 20;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Source of base names for a run.
#[async_trait]
pub trait NameSuggester: Send + Sync {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>, ScoutError>;
}

/// Names supplied up front with `--names`; the prompt is ignored.
pub struct StaticNames(pub Vec<String>);

#[async_trait]
impl NameSuggester for StaticNames {
    async fn suggest(&self, _prompt: &str) -> Result<Vec<String>, ScoutError> {
        Ok(self.0.clone())
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiSuggester {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SuggestedNames {
    domains: Vec<String>,
}

impl OpenAiSuggester {
    /// Build from `OPENAI_API_KEY` and, when `base_url` is not given,
    /// `OPENAI_BASE_URL`.
    pub fn from_env(
        model: String,
        count: usize,
        base_url: Option<String>,
    ) -> Result<Self, ScoutError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ScoutError::suggestion("OPENAI_API_KEY is not set (or pass --names to skip suggestions)")
            })?;

        let base_url = base_url
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScoutError::suggestion(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            count,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        build_request_body(&self.model, self.count, prompt)
    }
}

#[async_trait]
impl NameSuggester for OpenAiSuggester {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>, ScoutError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, count = self.count, "Requesting name suggestions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| ScoutError::suggestion(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::suggestion(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::suggestion(format!("Unexpected response shape: {}", e)))?;

        let names = parse_completion(chat)?;
        debug!(received = names.len(), "Received name suggestions");
        Ok(names)
    }
}

fn build_request_body(model: &str, count: usize, prompt: &str) -> serde_json::Value {
    let instructions = format!(
        "You recommend potential domain names for a product or business description. \
         Suggest exactly {} names. Each must be a plain name only: no subdomains, \
         no dots, no TLDs.",
        count
    );

    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": instructions },
            { "role": "user", "content": prompt },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "domains",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "domains": {
                            "type": "array",
                            "description": "A list of potential domains",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["domains"],
                    "additionalProperties": false
                }
            }
        }
    })
}

fn parse_completion(chat: ChatResponse) -> Result<Vec<String>, ScoutError> {
    let message = chat
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ScoutError::suggestion("Response contained no choices"))?;

    if let Some(refusal) = message.refusal {
        return Err(ScoutError::suggestion(format!("Model refused: {}", refusal)));
    }

    let content = message
        .content
        .ok_or_else(|| ScoutError::suggestion("Response message had no content"))?;

    let parsed: SuggestedNames = serde_json::from_str(&content)
        .map_err(|e| ScoutError::suggestion(format!("Content is not the expected JSON: {}", e)))?;

    let names = sanitize_names(&parsed.domains);
    if names.is_empty() {
        return Err(ScoutError::suggestion("Model returned no usable names"));
    }
    Ok(names)
}

/// Reduce model output to bare labels: anything from the first dot on is
/// dropped, then only `a-z`, `0-9` and inner hyphens are kept. Blanks and
/// repeats are removed.
pub fn sanitize_names(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(|name| {
            let lowered = name.trim().to_lowercase();
            let label = lowered.split('.').next().unwrap_or_default();
            let cleaned: String = label
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            let cleaned = cleaned.trim_matches('-').to_string();
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
