//! Chat proxy — forwards a single user message to a hosted LLM.
//!
//! No conversation history is kept: each call sends one message and
//! returns the first candidate text. Two providers are supported, Gemini
//! `generateContent` and OpenAI chat completions, selected in settings.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{ChatProviderKind, Settings};

/// Reply used when the provider answers without any text.
pub const NO_RESPONSE: &str = "No response";

/// Longest message accepted from a client.
pub const MAX_MESSAGE_CHARS: usize = 4000;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Cannot reach {0}")]
    Connection(String),
    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("Unreadable provider response: {0}")]
    ResponseParsing(String),
}

/// Anything that can answer a chat message.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    async fn reply(&self, message: &str) -> Result<String, ChatError>;
}

/// Build the provider selected in settings.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn ChatProvider>, ChatError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ChatError::HttpClient(e.to_string()))?;

    let provider: Arc<dyn ChatProvider> = match settings.chat_provider {
        ChatProviderKind::Gemini => Arc::new(GeminiClient::new(
            http,
            &settings.gemini_api_url,
            settings.gemini_api_key.clone(),
        )),
        ChatProviderKind::OpenAi => Arc::new(OpenAiClient::new(
            http,
            &settings.openai_api_url,
            settings.openai_api_key.clone(),
            &settings.openai_model,
        )),
    };

    let key_missing = match settings.chat_provider {
        ChatProviderKind::Gemini => settings.gemini_api_key.is_none(),
        ChatProviderKind::OpenAi => settings.openai_api_key.is_none(),
    };
    if key_missing {
        tracing::warn!(provider = provider.name(), "No API key set; chat requests will fail");
    }

    Ok(provider)
}

/// POST a JSON body and return the parsed JSON reply.
async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    endpoint: &str,
) -> Result<Value, ChatError> {
    let response = request.json(body).send().await.map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            ChatError::Connection(endpoint.to_string())
        } else {
            ChatError::HttpClient(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChatError::Provider {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ChatError::ResponseParsing(e.to_string()))
}

/// Text at `pointer`, or [`NO_RESPONSE`] when missing or empty.
fn text_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_RESPONSE)
        .to_string()
}

// ═══════════════════════════════════════════════════════════
// Gemini
// ═══════════════════════════════════════════════════════════

pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            api_key,
        }
    }

    pub fn request_body(message: &str) -> Value {
        json!({ "contents": [{ "parts": [{ "text": message }] }] })
    }

    /// First candidate's first text part.
    pub fn extract_reply(response: &Value) -> String {
        text_at(response, "/candidates/0/content/parts/0/text")
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ChatError::MissingApiKey("gemini"))?;

        let request = self.http.post(&self.api_url).query(&[("key", key)]);
        let response = post_json(request, &Self::request_body(message), &self.api_url).await?;
        Ok(Self::extract_reply(&response))
    }
}

// ═══════════════════════════════════════════════════════════
// OpenAI
// ═══════════════════════════════════════════════════════════

pub struct OpenAiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, api_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn request_body(&self, message: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": message }],
        })
    }

    pub fn extract_reply(response: &Value) -> String {
        text_at(response, "/choices/0/message/content")
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ChatError::MissingApiKey("openai"))?;

        let request = self.http.post(&self.api_url).bearer_auth(key);
        let response = post_json(request, &self.request_body(message), &self.api_url).await?;
        Ok(Self::extract_reply(&response))
    }
}

// ═══════════════════════════════════════════════════════════
// Mock
// ═══════════════════════════════════════════════════════════

/// Provider with a canned answer, or a canned failure.
pub struct MockChatProvider {
    reply: Result<String, String>,
}

impl MockChatProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn reply(&self, _message: &str) -> Result<String, ChatError> {
        self.reply
            .clone()
            .map_err(ChatError::Connection)
    }
}
