use crate::config::AnnotatorConfig;
use crate::types::{DigestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Trait for text-generation backends that produce annotations and overviews
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Get the name of this LLM adapter
    fn adapter_name(&self) -> String;

    /// Send one prompt and return the trimmed completion text.
    /// Empty completions are errors.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiAdapter {
    pub fn new(config: &AnnotatorConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Build from config, reading the key from the configured environment variable.
    pub fn from_config(config: &AnnotatorConfig) -> Result<Self> {
        Self::new(config, config.api_key()?)
    }
}

impl fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl LlmAdapter for OpenAiAdapter {
    fn adapter_name(&self) -> String {
        format!("OpenAI ({})", self.model)
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature,
        };

        debug!("Sending {} byte prompt to {}", prompt.len(), self.base_url);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::Annotation(format!("HTTP {}: {}", status, body.trim())));
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(DigestError::Annotation("empty completion".to_string()));
        }
        Ok(text)
    }
}

/// Mock LLM adapter for development and testing.
///
/// Without a fixed response it echoes the `Title:` line of the prompt back in
/// annotation layout, tagged with the configured relevance tier.
pub struct MockLlmAdapter {
    name: String,
    relevance: String,
    fixed_response: Option<String>,
    fail_when: Vec<String>,
    calls: AtomicUsize,
}

impl MockLlmAdapter {
    pub fn new(name: String) -> Self {
        Self {
            name,
            relevance: "High".to_string(),
            fixed_response: None,
            fail_when: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_relevance(mut self, tier: &str) -> Self {
        self.relevance = tier.to_string();
        self
    }

    /// Always answer with `text`. An empty string simulates a blank completion.
    pub fn with_response(mut self, text: &str) -> Self {
        self.fixed_response = Some(text.to_string());
        self
    }

    /// Fail any prompt containing `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_when.push(needle.to_string());
        self
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn extract_title(text: &str) -> String {
        match text.find("Title: ") {
            Some(start) => {
                let rest = &text[start + 7..];
                rest.lines().next().unwrap_or("").trim().to_string()
            }
            None => "Untitled Item".to_string(),
        }
    }
}

#[async_trait]
impl LlmAdapter for MockLlmAdapter {
    fn adapter_name(&self) -> String {
        format!("Mock LLM Adapter ({})", self.name)
    }

    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_when.iter().any(|needle| prompt.contains(needle.as_str())) {
            return Err(DigestError::Annotation("mock failure".to_string()));
        }

        let text = match &self.fixed_response {
            Some(text) => text.trim().to_string(),
            None => {
                let title = Self::extract_title(prompt);
                format!(
                    "Title: {}\nSummary: Mock summary of {}.\nRelevance to Arm: {}\n\
                     Company/Industry Mentions: Arm, Nvidia",
                    title, title, self.relevance
                )
            }
        };

        if text.is_empty() {
            return Err(DigestError::Annotation("empty completion".to_string()));
        }
        Ok(text)
    }
}
