//! Chart narration through a hosted text-generation endpoint.
//!
//! One global cooldown gates outbound calls: the check and the
//! timestamp update happen under a single lock, so concurrent requests
//! cannot both pass the window. Transport failures and a missing
//! credential both degrade to a fixed informational message — the
//! caller never sees a hard error from this module.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chart::Chart;

/// Fixed reply used whenever the narration backend cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str =
    "The narration service is currently unavailable. Please try again later.";

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const DEFAULT_COOLDOWN_SECONDS: u64 = 30;
const MAX_REPLY_TOKENS: u32 = 400;

// ---------------------------
// ## Configuration
// ---------------------------

/// Environment-driven narration settings.
#[derive(Debug, Clone)]
pub struct NarrationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub cooldown: Duration,
}

impl NarrationConfig {
    /// Read `AI_API_KEY`, `AI_MODEL`, `AI_BASE_URL` and
    /// `AI_COOLDOWN_SECONDS`, falling back to defaults for everything
    /// but the key.
    pub fn from_env() -> Self {
        let cooldown = std::env::var("AI_COOLDOWN_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_COOLDOWN_SECONDS);
        NarrationConfig {
            api_key: std::env::var("AI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("AI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            cooldown: Duration::from_secs(cooldown),
        }
    }
}

// ---------------------------
// ## Cooldown
// ---------------------------

/// Shared cooldown timestamp with an atomic check-and-set. The lock
/// covers both the read and the update, preserving "at most one call
/// per window" under concurrent requests.
#[derive(Debug)]
pub struct Cooldown {
    window: Duration,
    last: Mutex<Option<Instant>>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Cooldown {
            window,
            last: Mutex::new(None),
        }
    }

    /// Claim the window. `Err(remaining)` carries the whole seconds
    /// left, rounded up and never zero.
    pub fn try_acquire(&self) -> Result<(), u64> {
        let mut last = self.last.lock().expect("cooldown lock poisoned");
        let now = Instant::now();
        if let Some(previous) = *last {
            let elapsed = now.duration_since(previous);
            if elapsed < self.window {
                let remaining = self.window - elapsed;
                return Err(remaining.as_secs().max(1));
            }
        }
        *last = Some(now);
        Ok(())
    }
}

// ---------------------------
// ## Wire types
// ---------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Reply returned to the caller: either the narration text or the
/// fixed wait message with the remaining seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u64>,
}

#[derive(Debug, Error)]
enum NarrationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("empty completion")]
    Empty,
}

// ---------------------------
// ## Client
// ---------------------------

/// Cooldown-gated client for the hosted narration model.
pub struct NarrationClient {
    config: NarrationConfig,
    cooldown: Cooldown,
    http: Client,
}

impl NarrationClient {
    pub fn new(config: NarrationConfig) -> Self {
        let cooldown = Cooldown::new(config.cooldown);
        NarrationClient {
            config,
            cooldown,
            http: Client::new(),
        }
    }

    pub fn from_env() -> Self {
        NarrationClient::new(NarrationConfig::from_env())
    }

    /// Answer a question about a chart. Rejected while the cooldown
    /// window is open; degrades to [`UNAVAILABLE_MESSAGE`] on a missing
    /// key or any endpoint failure.
    pub async fn narrate(
        &self,
        chart: &Chart,
        question: &str,
        user_name: Option<&str>,
    ) -> NarrationResponse {
        if let Err(remaining) = self.cooldown.try_acquire() {
            return NarrationResponse {
                response: format!("Please wait {remaining} seconds before asking again."),
                cooldown: Some(remaining),
            };
        }

        let api_key = match &self.config.api_key {
            Some(key) => key.clone(),
            None => {
                log::warn!("narration requested without an API key");
                return NarrationResponse {
                    response: UNAVAILABLE_MESSAGE.to_string(),
                    cooldown: None,
                };
            }
        };

        let prompt = build_prompt(chart, question, user_name);
        match self.generate(&prompt, &api_key).await {
            Ok(raw) => NarrationResponse {
                response: clean_reply(&raw),
                cooldown: None,
            },
            Err(e) => {
                log::warn!("narration failed: {e}");
                NarrationResponse {
                    response: UNAVAILABLE_MESSAGE.to_string(),
                    cooldown: None,
                }
            }
        }
    }

    /// Plain text generation first, chat-style completion as fallback.
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, NarrationError> {
        match self.text_generation(prompt, api_key).await {
            Ok(text) => Ok(text),
            Err(e) => {
                log::debug!("text generation failed ({e}), trying chat completion");
                self.chat_completion(prompt, api_key).await
            }
        }
    }

    async fn text_generation(&self, prompt: &str, api_key: &str) -> Result<String, NarrationError> {
        let url = format!("{}/models/{}", self.config.base_url, self.config.model);
        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens: MAX_REPLY_TOKENS,
                return_full_text: false,
            },
        };
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NarrationError::Status(status));
        }
        let generated: Vec<GeneratedText> = response.json().await?;
        generated
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or(NarrationError::Empty)
    }

    async fn chat_completion(&self, prompt: &str, api_key: &str) -> Result<String, NarrationError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_REPLY_TOKENS,
        };
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NarrationError::Status(status));
        }
        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(NarrationError::Empty)
    }
}

// ---------------------------
// ## Prompt assembly
// ---------------------------

/// Structured chart summary plus the free-text question.
pub fn build_prompt(chart: &Chart, question: &str, user_name: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a Vedic astrologer. Interpret this birth chart.\n\n");
    if let Some(name) = user_name {
        prompt.push_str(&format!("The chart belongs to {name}.\n"));
    }
    prompt.push_str(&format!("Ascendant: {}\n\nPlacements:\n", chart.asc_sign));
    for p in &chart.placements {
        let status = if p.status.is_empty() {
            String::new()
        } else {
            format!(" [{}]", p.status.tags().join(", "))
        };
        prompt.push_str(&format!(
            "- {} in {} (house {}), {:.1} deg, dignity {}{}\n",
            p.body, p.sign, p.house, p.degree_in_sign, p.dignity, status
        ));
    }
    prompt.push_str("\nAspects:\n");
    for a in &chart.aspects {
        prompt.push_str(&format!(
            "- {} throws its {} aspect from house {} to house {} ({})\n",
            a.body, a.label, a.from_house, a.to_house, a.nature
        ));
    }
    prompt.push_str(&format!("\nQuestion: {question}\nAnswer:"));
    prompt
}

/// Strip delimiter and role-tag lines from a model reply.
pub fn clean_reply(raw: &str) -> String {
    raw.lines()
        .filter(|line| {
            let trimmed = line.trim();
            let is_delimiter = !trimmed.is_empty()
                && trimmed.chars().all(|c| matches!(c, '-' | '=' | '*' | '#'));
            let is_role_tag = ["User:", "Assistant:", "System:", "Question:", "Answer:"]
                .iter()
                .any(|tag| trimmed == *tag)
                || trimmed == "[INST]"
                || trimmed == "[/INST]";
            !is_delimiter && !is_role_tag
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
