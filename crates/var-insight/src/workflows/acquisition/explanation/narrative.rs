use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::super::domain::Dimension;
use super::{template_summary, BreakdownEntry};
use crate::config::NarrativeConfig;

/// Structured prompt handed to a narrative generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub var_name: String,
    pub rank: usize,
    pub composite_score: f64,
    pub breakdown: Vec<BreakdownEntry>,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

/// Free text produced for an explanation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    #[serde(default)]
    pub reasoning: BTreeMap<Dimension, String>,
}

/// Capability: produce summary text from a structured breakdown.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<Narrative, NarrativeError>;
}

/// Failure talking to a narrative generator; always recovered by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative generator unavailable: {0}")]
    Unavailable(String),
    #[error("narrative transport failed: {0}")]
    Transport(String),
    #[error("narrative response was malformed: {0}")]
    InvalidResponse(String),
    #[error("narrative generator timed out after {millis}ms")]
    Timeout { millis: u64 },
    #[error("narrative generator returned an empty summary")]
    Empty,
}

/// Deterministic generator that renders the structural template. No I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

#[async_trait]
impl NarrativeGenerator for TemplateNarrator {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<Narrative, NarrativeError> {
        Ok(Narrative {
            summary: template_summary(request),
            reasoning: BTreeMap::new(),
        })
    }
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct HttpNarrator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HttpNarrator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NarrativeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NarrativeError::Unavailable(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        })
    }

    /// Build from configuration; `None` when no endpoint is configured.
    pub fn from_config(config: &NarrativeConfig) -> Result<Option<Self>, NarrativeError> {
        match config.endpoint.as_deref() {
            Some(endpoint) => Self::new(
                endpoint,
                config.api_key.clone(),
                config.model.clone(),
                config.timeout(),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    fn payload(&self, request: &NarrativeRequest) -> Result<serde_json::Value, NarrativeError> {
        let structured = serde_json::to_string(request)
            .map_err(|err| NarrativeError::InvalidResponse(err.to_string()))?;
        let keys: Vec<&str> = Dimension::ALL.iter().map(|dimension| dimension.key()).collect();

        Ok(json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                {
                    "role": "system",
                    "content": format!(
                        "You are an M&A analyst writing acquisition fit justifications for \
                         value-added resellers. Reply with a JSON object containing 'summary' \
                         (two or three sentences) and 'reasoning', an object keyed by any of \
                         [{}] with one sentence per dimension. Use only the facts provided.",
                        keys.join(", ")
                    ),
                },
                { "role": "user", "content": structured },
            ],
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NarrativeReply {
    summary: String,
    #[serde(default)]
    reasoning: BTreeMap<String, String>,
}

#[async_trait]
impl NarrativeGenerator for HttpNarrator {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<Narrative, NarrativeError> {
        let mut call = self.client.post(&self.endpoint).json(&self.payload(request)?);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        debug!(endpoint = %self.endpoint, model = %self.model, var = %request.var_name, "requesting narrative");

        let response = call
            .send()
            .await
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NarrativeError::Unavailable(format!(
                "endpoint returned {status}"
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|err| NarrativeError::InvalidResponse(err.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| NarrativeError::InvalidResponse("no content in reply".to_string()))?;

        parse_reply(&content)
    }
}

/// Parse the generator's JSON reply, ignoring reasoning keys that are not dimensions.
pub(crate) fn parse_reply(content: &str) -> Result<Narrative, NarrativeError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let reply: NarrativeReply = serde_json::from_str(trimmed)
        .map_err(|err| NarrativeError::InvalidResponse(err.to_string()))?;

    if reply.summary.trim().is_empty() {
        return Err(NarrativeError::Empty);
    }

    let reasoning = reply
        .reasoning
        .into_iter()
        .filter_map(|(key, text)| Dimension::from_key(&key).map(|dimension| (dimension, text)))
        .filter(|(_, text)| !text.trim().is_empty())
        .collect();

    Ok(Narrative {
        summary: reply.summary.trim().to_string(),
        reasoning,
    })
}
