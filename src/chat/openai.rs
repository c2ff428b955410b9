//! OpenAI-compatible chat completions client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatModel};
use crate::error::{Error, Result};
use crate::http;

/// Chat completions client for OpenAI-compatible endpoints.
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    /// Builds a client for `model` at `base_url`.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingConfig(vec!["OPENAI_API_KEY"]));
        }
        Ok(Self {
            client: http::json_client(timeout, Some(api_key))?,
            endpoint: http::endpoint(base_url, "chat/completions"),
            model: model.trim().to_string(),
            temperature,
        })
    }
}

impl ChatModel for OpenAiChat {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let resp = self.client.post(&self.endpoint).json(&body).send()?;
        let resp = http::check_status(resp, "OpenAI chat").map_err(Error::Chat)?;
        let parsed: ChatResponse = resp.json()?;
        parsed.into_answer()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_answer(self) -> Result<String> {
        self.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| Error::Chat("OpenAI returned no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_choice_content() {
        let body = concat!(
            r#"{"id":"x","choices":[{"index":0,"#,
            r#""message":{"role":"assistant","content":"Light."},"finish_reason":"stop"}]}"#
        );
        let parsed: ChatResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(parsed.into_answer().expect("answer"), "Light.");
    }

    #[test]
    fn empty_choices_are_an_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).expect("decode");
        assert!(matches!(parsed.into_answer(), Err(Error::Chat(_))));
    }
}
