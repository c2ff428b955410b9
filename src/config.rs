//! Command-line and environment configuration for the three stages.
//!
//! Every flag falls back to an environment variable. Parsed arguments are
//! turned into validated per-stage configs; all missing required values are
//! reported together.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};
use url::Url;

use crate::chat::{ChatModel, OllamaChat, OpenAiChat, DEFAULT_TEMPERATURE};
use crate::chunker::{TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::collector::DATA_FILE_NAME;
use crate::embedder::{Embedder, OllamaEmbedder, OpenAiEmbedder, DEFAULT_BATCH_SIZE};
use crate::error::{Error, Result};
use crate::record::RecordFormat;
use crate::responder::DEFAULT_TOP_K;
use crate::vector_store::{CollectionName, SqliteVectorStore};
use crate::wikipedia::{DEFAULT_API_URL, DEFAULT_USER_AGENT};

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Backend serving embeddings and chat completions.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelProvider {
    /// Ollama HTTP API.
    Ollama,
    /// OpenAI-compatible HTTP API.
    #[value(name = "openai")]
    OpenAi,
}

/// Collects the names of required values that are unset or blank.
#[derive(Debug, Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn value(&mut self, name: &'static str, value: &Option<String>) -> String {
        match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingConfig(self.missing))
        }
    }
}

fn validate_url(name: &str, value: &str) -> Result<String> {
    let parsed = Url::parse(value.trim()).map_err(|err| {
        Error::InvalidConfig(format!("{name} '{value}' is not a valid URL: {err}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(value.trim().to_string()),
        other => Err(Error::InvalidConfig(format!(
            "{name} must use http or https, got '{other}'"
        ))),
    }
}

/// `wikirag-collect` arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikirag-collect",
    version,
    about = "Scrape Wikipedia articles for every keyword into the dataset folder"
)]
pub struct CollectorCli {
    /// File holding the persistent snapshot id
    #[arg(long, env = "SNAPSHOT_STORAGE_FILE")]
    pub snapshot_file: Option<String>,

    /// Folder receiving data.txt
    #[arg(long, env = "DATASET_STORAGE_FOLDER")]
    pub dataset_folder: Option<String>,

    /// CSV file with a `Keyword` column
    #[arg(long, env = "KEYWORDS_FILE", default_value = "keywords.csv")]
    pub keywords_file: PathBuf,

    /// MediaWiki API endpoint
    #[arg(long, env = "WIKIPEDIA_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// User-Agent header sent to Wikipedia
    #[arg(long, env = "WIKIPEDIA_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Pause between keywords in milliseconds
    #[arg(long, env = "KEYWORD_DELAY_MS", default_value_t = 500)]
    pub keyword_delay_ms: u64,

    /// Output layout: fragment or jsonl
    #[arg(long, env = "RECORD_FORMAT", default_value = "fragment")]
    pub record_format: RecordFormat,
}

/// Validated collector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Snapshot sentinel file.
    pub snapshot_file: PathBuf,
    /// Collector output file.
    pub output: PathBuf,
    /// Keyword table.
    pub keywords_file: PathBuf,
    /// MediaWiki API endpoint.
    pub api_url: String,
    /// User-Agent header.
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Pause between keywords.
    pub keyword_delay: Duration,
    /// Output layout.
    pub record_format: RecordFormat,
}

impl CollectorCli {
    /// Validates the arguments.
    pub fn into_config(self) -> Result<CollectorConfig> {
        let mut required = Required::default();
        let snapshot_file = required.value("SNAPSHOT_STORAGE_FILE", &self.snapshot_file);
        let dataset_folder = required.value("DATASET_STORAGE_FOLDER", &self.dataset_folder);
        required.finish()?;

        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidConfig("REQUEST_TIMEOUT_SECS must be positive".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::InvalidConfig("WIKIPEDIA_USER_AGENT must not be blank".into()));
        }

        Ok(CollectorConfig {
            snapshot_file: PathBuf::from(snapshot_file),
            output: PathBuf::from(dataset_folder).join(DATA_FILE_NAME),
            keywords_file: self.keywords_file,
            api_url: validate_url("WIKIPEDIA_API_URL", &self.api_url)?,
            user_agent: self.user_agent.trim().to_string(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            keyword_delay: Duration::from_millis(self.keyword_delay_ms),
            record_format: self.record_format,
        })
    }
}

/// Model and vector store arguments shared by the indexer and the responder.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Embedding model name
    #[arg(long, env = "EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Vector store persistence directory
    #[arg(long, env = "DATABASE_LOCATION")]
    pub database_location: Option<String>,

    /// Vector store collection
    #[arg(long, env = "COLLECTION_NAME")]
    pub collection_name: Option<String>,

    /// Model backend
    #[arg(long, env = "MODEL_PROVIDER", value_enum, default_value = "ollama")]
    pub provider: ModelProvider,

    /// Ollama server address
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_HOST)]
    pub ollama_host: String,

    /// OpenAI API key (openai provider only)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Model request timeout in seconds (unset = no timeout)
    #[arg(long, env = "MODEL_TIMEOUT_SECS")]
    pub model_timeout_secs: Option<u64>,
}

struct RequiredModel {
    embedding_model: String,
    database_location: String,
    collection_name: String,
    api_key: String,
}

impl ModelArgs {
    fn require(&self, required: &mut Required) -> RequiredModel {
        let embedding_model = required.value("EMBEDDING_MODEL", &self.embedding_model);
        let database_location = required.value("DATABASE_LOCATION", &self.database_location);
        let collection_name = required.value("COLLECTION_NAME", &self.collection_name);
        let api_key = match self.provider {
            ModelProvider::OpenAi => required.value("OPENAI_API_KEY", &self.openai_api_key),
            ModelProvider::Ollama => String::new(),
        };
        RequiredModel {
            embedding_model,
            database_location,
            collection_name,
            api_key,
        }
    }

    fn build(&self, values: RequiredModel) -> Result<(ModelSettings, StoreSettings)> {
        let endpoint = match self.provider {
            ModelProvider::Ollama => validate_url("OLLAMA_HOST", &self.ollama_host)?,
            ModelProvider::OpenAi => validate_url("OPENAI_BASE_URL", &self.openai_base_url)?,
        };
        let timeout = match self.model_timeout_secs {
            Some(0) => {
                return Err(Error::InvalidConfig("MODEL_TIMEOUT_SECS must be positive".into()))
            }
            other => other.map(Duration::from_secs),
        };
        let models = ModelSettings {
            provider: self.provider,
            endpoint,
            api_key: values.api_key,
            embedding_model: values.embedding_model,
            timeout,
        };
        let store = StoreSettings {
            location: PathBuf::from(values.database_location),
            collection: CollectionName::new(values.collection_name)?,
        };
        Ok((models, store))
    }
}

/// Resolved model backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// Selected backend.
    pub provider: ModelProvider,
    /// Ollama host or OpenAI base URL, depending on the provider.
    pub endpoint: String,
    /// API key; empty for Ollama.
    pub api_key: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl ModelSettings {
    /// Builds the embedding client for the configured provider.
    pub fn embedder(&self, batch_size: usize) -> Result<Box<dyn Embedder>> {
        Ok(match self.provider {
            ModelProvider::Ollama => Box::new(OllamaEmbedder::new(
                &self.endpoint,
                &self.embedding_model,
                self.timeout,
                batch_size,
            )?),
            ModelProvider::OpenAi => Box::new(OpenAiEmbedder::new(
                &self.api_key,
                &self.endpoint,
                &self.embedding_model,
                self.timeout,
                batch_size,
            )?),
        })
    }

    /// Builds the chat client for `model`.
    pub fn chat(&self, model: &str, temperature: f32) -> Result<Box<dyn ChatModel>> {
        Ok(match self.provider {
            ModelProvider::Ollama => Box::new(OllamaChat::new(
                &self.endpoint,
                model,
                temperature,
                self.timeout,
            )?),
            ModelProvider::OpenAi => Box::new(OpenAiChat::new(
                &self.api_key,
                &self.endpoint,
                model,
                temperature,
                self.timeout,
            )?),
        })
    }
}

/// Where the vector collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Persistence directory.
    pub location: PathBuf,
    /// Collection name.
    pub collection: CollectionName,
}

impl StoreSettings {
    /// Opens the local store for these settings.
    pub fn open(&self) -> SqliteVectorStore {
        SqliteVectorStore::open(self.location.clone(), self.collection.clone())
    }
}

/// `wikirag-index` arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikirag-index",
    version,
    about = "Chunk and embed the collected articles into a fresh vector store"
)]
pub struct IndexerCli {
    /// Embedding backend and vector store location.
    #[command(flatten)]
    pub model: ModelArgs,

    /// Folder holding data.txt
    #[arg(long, env = "DATASET_STORAGE_FOLDER")]
    pub dataset_folder: Option<String>,

    /// Maximum chunk length in characters
    #[arg(long, env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "CHUNK_OVERLAP", default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Texts per embedding request
    #[arg(long, env = "EMBED_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub embed_batch_size: usize,
}

/// Validated indexer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Collector output to index.
    pub input: PathBuf,
    /// Chunking parameters.
    pub splitter: TextSplitter,
    /// Texts per embedding request.
    pub embed_batch_size: usize,
    /// Model backend.
    pub models: ModelSettings,
    /// Target collection.
    pub store: StoreSettings,
}

impl IndexerCli {
    /// Validates the arguments.
    pub fn into_config(self) -> Result<IndexerConfig> {
        let mut required = Required::default();
        let values = self.model.require(&mut required);
        let dataset_folder = required.value("DATASET_STORAGE_FOLDER", &self.dataset_folder);
        required.finish()?;

        if self.embed_batch_size == 0 {
            return Err(Error::InvalidConfig("EMBED_BATCH_SIZE must be positive".into()));
        }
        let splitter = TextSplitter::new(self.chunk_size, self.chunk_overlap)?;
        let (models, store) = self.model.build(values)?;

        Ok(IndexerConfig {
            input: PathBuf::from(dataset_folder).join(DATA_FILE_NAME),
            splitter,
            embed_batch_size: self.embed_batch_size,
            models,
            store,
        })
    }
}

/// `wikirag-ask` arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikirag-ask",
    version,
    about = "Answer questions from the indexed Wikipedia articles"
)]
pub struct AskCli {
    /// Embedding and chat backend plus the collection to search.
    #[command(flatten)]
    pub model: ModelArgs,

    /// Chat model name
    #[arg(long, env = "LLM_MODEL")]
    pub llm_model: Option<String>,

    /// Chunks retrieved per question
    #[arg(long, env = "TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Sampling temperature
    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Answer a single question and exit instead of starting the prompt loop
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Validated responder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponderConfig {
    /// Model backend.
    pub models: ModelSettings,
    /// Collection to search.
    pub store: StoreSettings,
    /// Chat model name.
    pub llm_model: String,
    /// Chunks retrieved per question.
    pub top_k: usize,
    /// Sampling temperature.
    pub temperature: f32,
}

impl AskCli {
    /// Validates the arguments.
    pub fn into_config(&self) -> Result<ResponderConfig> {
        let mut required = Required::default();
        let values = self.model.require(&mut required);
        let llm_model = required.value("LLM_MODEL", &self.llm_model);
        required.finish()?;

        if self.top_k == 0 {
            return Err(Error::InvalidConfig("TOP_K must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::InvalidConfig(format!(
                "LLM_TEMPERATURE must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        let (models, store) = self.model.build(values)?;

        Ok(ResponderConfig {
            models,
            store,
            llm_model,
            top_k: self.top_k,
            temperature: self.temperature,
        })
    }
}
