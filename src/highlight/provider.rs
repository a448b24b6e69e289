/// LLM anchor provider
///
/// Asks an OpenAI-compatible Chat Completions endpoint (json_object response
/// format) for the opening and closing words of the sentence in a paragraph
/// that best answers a query. The anchors are untrusted: they are only used as
/// input to fuzzy matching, never shown directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while requesting anchors.
#[derive(Debug, Error)]
pub enum AnchorError {
    /// Transport or JSON parse failure
    #[error("Anchor generation error: {0}")]
    Generation(String),

    /// API provider returned an HTTP error
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider not configured (e.g., missing API key)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Start/end phrases delimiting one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnchors {
    pub start: String,
    pub end: String,
}

/// Source of sentence anchors for a (query, paragraph) pair.
#[async_trait]
pub trait AnchorProvider: Send + Sync {
    /// `Ok(None)` means the model found no relevant sentence.
    async fn anchors(
        &self,
        query: &str,
        paragraph: &str,
    ) -> Result<Option<SentenceAnchors>, AnchorError>;

    fn model_name(&self) -> &str;
}

/// Build the anchor extraction prompt.
pub fn build_anchor_prompt(query: &str, paragraph: &str) -> String {
    format!(
        "You are helping a reader find the sentence in a passage that best answers their search.\n\
         Copy the first 3-6 words and the last 3-6 words of that single sentence exactly as \
         they appear in the passage.\n\
         Output only valid JSON: {{\"start\": \"...\", \"end\": \"...\"}}. \
         If no sentence is relevant, output {{\"start\": null, \"end\": null}}. \
         Do not add commentary.\n\n\
         Search: {query}\n\n\
         Passage:\n{paragraph}"
    )
}

// --- HTTP request/response structs ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Model output shape; either field may be null or missing.
#[derive(Deserialize)]
struct AnchorOutput {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

/// Parse model output into anchors. Blank or missing fields mean "no sentence".
pub fn parse_anchor_output(content: &str) -> Result<Option<SentenceAnchors>, AnchorError> {
    let output: AnchorOutput = serde_json::from_str(content).map_err(|e| {
        AnchorError::Generation(format!(
            "Failed to parse anchor JSON from model output: {} (content: {})",
            e, content
        ))
    })?;

    match (output.start, output.end) {
        (Some(start), Some(end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
            Ok(Some(SentenceAnchors { start, end }))
        }
        _ => Ok(None),
    }
}

/// OpenAI-compatible anchor provider. base_url is configurable.
pub struct OpenAIAnchorProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIAnchorProvider {
    /// # Errors
    /// Returns `AnchorError::NotConfigured` if api_key is empty.
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, AnchorError> {
        if api_key.trim().is_empty() {
            return Err(AnchorError::NotConfigured(
                "API key is required for the anchor provider. \
                 Set SCRIPTURE_ANCHORS__OPENAI_API_KEY or anchors.openai_api_key in scripture.toml"
                    .to_string(),
            ));
        }

        Ok(OpenAIAnchorProvider {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        })
    }

    async fn chat(&self, prompt: String) -> Result<String, AnchorError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnchorError::Generation(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AnchorError::Api { status, message: body });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AnchorError::Generation(format!("Failed to parse chat response: {}", e))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AnchorError::Generation("Model returned empty choices list".to_string()))
    }
}

#[async_trait]
impl AnchorProvider for OpenAIAnchorProvider {
    async fn anchors(
        &self,
        query: &str,
        paragraph: &str,
    ) -> Result<Option<SentenceAnchors>, AnchorError> {
        let content = self.chat(build_anchor_prompt(query, paragraph)).await?;
        parse_anchor_output(&content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
