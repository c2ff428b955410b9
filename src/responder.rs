//! Query responder: retrieve nearest chunks and ask the chat model.

use tracing::{debug, info};

use crate::chat::ChatModel;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::vector_store::{ScoredEntry, VectorStore};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;
/// Characters of context shown before the preview is cut.
pub const CONTEXT_PREVIEW_CHARS: usize = 1000;

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Retrieved chunk texts joined with blank lines, in rank order.
    pub context: String,
    /// Model reply.
    pub text: String,
    /// Retrieved chunks with their scores.
    pub sources: Vec<ScoredEntry>,
}

/// Builds the prompt sent to the chat model.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the following question using the provided context.\n\n\
         Context:\n{context}\n\n\
         Question: {question}"
    )
}

/// First `limit` characters of `context`, with `...` appended when cut.
pub fn preview(context: &str, limit: usize) -> String {
    match context.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &context[..cut]),
        None => context.to_string(),
    }
}

/// Stateless question answering over a vector store.
pub struct Responder<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    chat: &'a dyn ChatModel,
    top_k: usize,
}

impl<'a> Responder<'a> {
    /// Wires the responder with the default `top_k`.
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        chat: &'a dyn ChatModel,
    ) -> Self {
        Self {
            embedder,
            store,
            chat,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Overrides how many chunks are retrieved.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Embeds `question`, retrieves context and generates the answer.
    pub fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }

        let query = self.embedder.embed(question)?;
        let sources = self.store.search(&query, self.top_k)?;
        info!(retrieved = sources.len(), "retrieved context chunks");

        let context = sources
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = build_prompt(&context, question);
        debug!(prompt_chars = prompt.chars().count(), "sending prompt");
        let text = self.chat.generate(&prompt)?;

        Ok(Answer {
            context,
            text,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::StoreEntry;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct AxisEmbedder;

    impl Embedder for AxisEmbedder {
        fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs
                .iter()
                .map(|text| {
                    if text.contains("light") {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    struct MemoryStore {
        entries: Vec<StoreEntry>,
    }

    impl VectorStore for MemoryStore {
        fn reset(&self) -> Result<()> {
            Ok(())
        }

        fn upsert(&self, _entries: Vec<StoreEntry>) -> Result<()> {
            Ok(())
        }

        fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>> {
            if self.entries.is_empty() {
                return Err(Error::EmptyStore("memory".into()));
            }
            let mut hits: Vec<ScoredEntry> = self
                .entries
                .iter()
                .map(|entry| ScoredEntry {
                    id: entry.id.clone(),
                    text: entry.text.clone(),
                    score: crate::vector_store::cosine_similarity(query, &entry.embedding),
                })
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(k);
            Ok(hits)
        }

        fn count(&self) -> Result<usize> {
            Ok(self.entries.len())
        }
    }

    #[derive(Default)]
    struct RecordingChat {
        prompts: RefCell<Vec<String>>,
    }

    impl ChatModel for RecordingChat {
        fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("Plants turn light into sugar.".to_string())
        }
    }

    fn entry(id: &str, text: &str, embedding: Vec<f32>) -> StoreEntry {
        StoreEntry {
            id: id.into(),
            text: text.into(),
            embedding,
        }
    }

    #[test]
    fn answers_with_ranked_context_and_fixed_prompt() {
        let store = MemoryStore {
            entries: vec![
                entry("1", "Soil holds water.", vec![0.0, 1.0]),
                entry("2", "Leaves absorb light.", vec![1.0, 0.1]),
                entry("3", "Chlorophyll is green.", vec![0.9, 0.5]),
                entry("4", "Roots grow down.", vec![0.1, 1.0]),
            ],
        };
        let chat = RecordingChat::default();
        let responder = Responder::new(&AxisEmbedder, &store, &chat);

        let answer = responder.answer("  How do plants use light?  ").expect("answer");

        assert_eq!(answer.text, "Plants turn light into sugar.");
        assert_eq!(answer.sources.len(), 3);
        assert_eq!(
            answer.context,
            "Leaves absorb light.\n\nChlorophyll is green.\n\nRoots grow down."
        );
        assert_eq!(
            chat.prompts.borrow()[0],
            "Answer the following question using the provided context.\n\nContext:\n\
             Leaves absorb light.\n\nChlorophyll is green.\n\nRoots grow down.\n\n\
             Question: How do plants use light?"
        );
    }

    #[test]
    fn top_k_limits_context() {
        let store = MemoryStore {
            entries: vec![
                entry("1", "a light", vec![1.0, 0.0]),
                entry("2", "b", vec![0.0, 1.0]),
            ],
        };
        let chat = RecordingChat::default();
        let responder = Responder::new(&AxisEmbedder, &store, &chat).with_top_k(1);

        let answer = responder.answer("light?").expect("answer");
        assert_eq!(answer.context, "a light");
    }

    #[test]
    fn empty_store_and_blank_question_surface_errors() {
        let store = MemoryStore { entries: Vec::new() };
        let chat = RecordingChat::default();
        let responder = Responder::new(&AxisEmbedder, &store, &chat);

        assert!(matches!(responder.answer("   "), Err(Error::EmptyQuestion)));
        assert!(matches!(responder.answer("light?"), Err(Error::EmptyStore(_))));
        assert!(chat.prompts.borrow().is_empty());
    }

    #[test]
    fn preview_cuts_long_context_only() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
        assert_eq!(preview("ééééé", 3), "ééé...");
        let long = "x".repeat(CONTEXT_PREVIEW_CHARS + 5);
        let shown = preview(&long, CONTEXT_PREVIEW_CHARS);
        assert_eq!(shown.len(), CONTEXT_PREVIEW_CHARS + 3);
        assert!(shown.ends_with("..."));
    }
}
