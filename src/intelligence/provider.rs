//! Text-generation collaborator.
//!
//! The pipeline sees the model as an untrusted `complete(system, user,
//! temperature) -> text` function. `OllamaClient` is the production
//! implementation; `RetryingGenerator` adds a bounded retry policy for
//! transport failures only.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ExtractionError;

/// Anything that turns a prompt into raw model text.
pub trait TextGenerator {
    fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        temperature: f32,
    ) -> Result<String, ExtractionError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        temperature: f32,
    ) -> Result<String, ExtractionError> {
        (**self).complete(system_instruction, user_message, temperature)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Blocking client for Ollama's `/api/chat` endpoint.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ExtractionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout_secs,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ExtractionError> {
        Self::new(&config.ollama_url, &config.model, config.timeout_secs)
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::Timeout(self.timeout_secs)
        } else {
            ExtractionError::Transport(format!("Ollama request failed: {}", e))
        }
    }
}

impl TextGenerator for OllamaClient {
    fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        temperature: f32,
    ) -> Result<String, ExtractionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            stream: false,
            options: ChatOptions { temperature },
        };

        log::debug!("Calling {} with model '{}'", self.chat_url(), self.model);

        let resp = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            let message = format!("Ollama API error {}: {}", status, text);
            // 4xx (unknown model, bad request) won't improve on retry.
            return Err(if status.is_client_error() && status.as_u16() != 429 {
                ExtractionError::Configuration(message)
            } else {
                ExtractionError::Transport(message)
            });
        }

        let parsed: ChatResponse = resp.json().map_err(|e| {
            if e.is_timeout() {
                ExtractionError::Timeout(self.timeout_secs)
            } else {
                ExtractionError::UnparseableResponse(format!("Ollama reply was not JSON: {}", e))
            }
        })?;

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| ExtractionError::UnparseableResponse("Ollama reply had no message".into()))
    }
}

/// Bounded retry around another generator. Only retryable errors
/// (transport, timeout) are repeated, with linear backoff.
pub struct RetryingGenerator<G> {
    inner: G,
    max_retries: u32,
    backoff: Duration,
}

impl<G: TextGenerator> RetryingGenerator<G> {
    pub fn new(inner: G, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            backoff: Duration::from_secs(2),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl<G: TextGenerator> TextGenerator for RetryingGenerator<G> {
    fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        temperature: f32,
    ) -> Result<String, ExtractionError> {
        let mut attempt = 0;
        loop {
            match self
                .inner
                .complete(system_instruction, user_message, temperature)
            {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Model call failed ({}), retry {}/{}",
                        e,
                        attempt,
                        self.max_retries
                    );
                    thread::sleep(self.backoff * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
