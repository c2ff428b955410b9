//! Ollama embeddings client (`POST /api/embed`).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_batch_within, Embedder};
use crate::error::{Error, Result};
use crate::http;

/// Blocking client for a local or remote Ollama server.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl OllamaEmbedder {
    /// Builds a client for `model` served at `host`.
    pub fn new(
        host: &str,
        model: &str,
        timeout: Option<Duration>,
        batch_size: usize,
    ) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(Error::MissingConfig(vec!["EMBEDDING_MODEL"]));
        }
        Ok(Self {
            client: http::json_client(timeout, None)?,
            endpoint: http::endpoint(host, "api/embed"),
            model: model.trim().to_string(),
            batch_size: batch_size.max(1),
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        ensure_batch_within(inputs, self.batch_size)?;

        let request = EmbedRequest {
            model: &self.model,
            input: inputs,
        };
        let resp = self.client.post(&self.endpoint).json(&request).send()?;
        let resp = http::check_status(resp, "Ollama embed").map_err(Error::Embedding)?;
        let parsed: EmbedResponse = resp.json()?;
        parsed.into_vectors(inputs.len())
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    #[serde(borrow)]
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl EmbedResponse {
    fn into_vectors(self, expected: usize) -> Result<Vec<Vec<f32>>> {
        if self.embeddings.len() != expected {
            return Err(Error::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                self.embeddings.len(),
                expected
            )));
        }
        Ok(self.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_embed_response() {
        let body = concat!(
            r#"{"model":"nomic-embed-text","#,
            r#""embeddings":[[0.1,0.2],[0.3,0.4]],"total_duration":1}"#
        );
        let parsed: EmbedResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(
            parsed.into_vectors(2).expect("vectors"),
            vec![vec![0.1, 0.2], vec![0.3, 0.4]]
        );
    }

    #[test]
    fn request_carries_model_and_inputs() {
        let request = EmbedRequest {
            model: "nomic-embed-text",
            input: &["a", "b"],
        };
        assert_eq!(
            serde_json::to_string(&request).expect("encode"),
            r#"{"model":"nomic-embed-text","input":["a","b"]}"#
        );
    }

    #[test]
    fn missing_embeddings_field_is_a_mismatch() {
        let parsed: EmbedResponse = serde_json::from_str(r#"{"error_free":true}"#).expect("decode");
        assert!(matches!(parsed.into_vectors(1), Err(Error::Embedding(_))));
    }

    #[test]
    fn blank_model_is_missing_config() {
        assert!(matches!(
            OllamaEmbedder::new("http://localhost:11434", "  ", None, 4),
            Err(Error::MissingConfig(_))
        ));
    }
}
