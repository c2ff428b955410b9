//! Chat model clients used to generate answers.

mod ollama;
mod openai;

pub use ollama::OllamaChat;
pub use openai::OpenAiChat;

use crate::error::Result;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Generates a completion for a single user prompt.
pub trait ChatModel {
    /// Returns the model's reply to `prompt`.
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}
