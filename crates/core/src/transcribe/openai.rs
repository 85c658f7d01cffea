//! OpenAI-backed transcriber.
//! Asks a chat-completions endpoint for the romanized reading of a cue.

use super::Transcriber;
use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::trace;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You transcribe subtitle text into its romanized phonetic reading \
(pinyin with tone marks for Chinese, Hepburn for Japanese, and so on). \
Reply with the reading only, keeping the line breaks of the input.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Transcriber that delegates to the OpenAI chat completion API.
pub struct OpenAiTranscriber {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiTranscriber {
    /// Read the API key from `OPENAI_API_KEY` and, if set, the endpoint from `OPENAI_BASE_URL`.
    pub fn new() -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY is not set"))?;
        let transcriber = Self::with_api_key(key);
        Ok(match std::env::var("OPENAI_BASE_URL") {
            Ok(url) => transcriber.with_base_url(url),
            Err(_) => transcriber,
        })
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a JSON body to the chat completions endpoint and decode the reply.
    fn post_chat(&self, body: Value) -> Result<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        trace!("post_chat url={url} model={}", self.model);
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        let resp = resp.error_for_status()?;
        Ok(resp.json()?)
    }
}

impl Transcriber for OpenAiTranscriber {
    fn transcribe(&self, text: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": text},
            ],
        });
        let resp = self.post_chat(body)?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("missing content"))
    }
}
