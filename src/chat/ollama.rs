//! Ollama chat client (`POST /api/chat`, non-streaming).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatModel};
use crate::error::{Error, Result};
use crate::http;

/// Non-streaming client for Ollama's `/api/chat`.
pub struct OllamaChat {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OllamaChat {
    /// Builds a client for `model` served at `host`.
    pub fn new(
        host: &str,
        model: &str,
        temperature: f32,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            client: http::json_client(timeout, None)?,
            endpoint: http::endpoint(host, "api/chat"),
            model: model.trim().to_string(),
            temperature,
        })
    }
}

impl ChatModel for OllamaChat {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };
        let resp = self.client.post(&self.endpoint).json(&body).send()?;
        let resp = http::check_status(resp, "Ollama chat").map_err(Error::Chat)?;
        let parsed: ChatResponse = resp.json()?;
        parsed.into_answer()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl ChatResponse {
    fn into_answer(self) -> Result<String> {
        if let Some(err) = self.error {
            return Err(Error::Chat(err));
        }
        self.message
            .map(|message| message.content)
            .ok_or_else(|| Error::Chat("Ollama returned no message".into()))
    }
}
