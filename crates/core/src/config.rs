//! Configuration management for the Office RAG system.
//!
//! Configuration is layered, lowest precedence first:
//! - Built-in defaults
//! - YAML config file (`.office-rag/config.yaml` in the workspace, or `OFFICE_RAG_CONFIG`)
//! - Environment variables (`OFFICE_RAG_*`, `RUST_LOG`, `NO_COLOR`)
//! - Command-line flags (`with_overrides`)
//!
//! The resulting `AppConfig` is read-only for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Prefix shared by every environment variable this crate reads.
pub const ENV_PREFIX: &str = "OFFICE_RAG_";

/// Characters assumed per token when turning the token budget into a character budget.
pub const CHARS_PER_TOKEN: usize = 4;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .office-rag/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Base URL of the Ollama service used for generation and embeddings
    pub ollama_base_url: String,

    /// Generation model identifier
    pub ollama_model: String,

    /// Timeout in seconds for each call to the Ollama service
    pub ollama_timeout: u64,

    /// Embedding model used to embed queries
    pub embedding_model: String,

    /// SQLite index location; defaults to `.office-rag/index.sqlite`
    pub index_path: Option<PathBuf>,

    /// Name of the document collection inside the index
    pub collection_name: String,

    /// Number of chunks requested from the vector store
    pub retrieval_top_k: usize,

    /// Minimum similarity (0..1) a chunk needs to be used as context
    pub relevance_score_threshold: f32,

    /// Token budget for the assembled context block
    pub max_context_tokens: usize,

    /// Sampling temperature for generation
    pub temperature: f32,

    /// Directory ingested when no path is given; defaults to `documents/` in the workspace
    pub documents_dir: Option<PathBuf>,

    /// Maximum characters per ingested chunk
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// HTTP bind host
    pub api_host: String,

    /// HTTP bind port
    pub api_port: u16,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Partial configuration as read from the YAML file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    ollama: Option<OllamaSection>,
    index: Option<IndexSection>,
    retrieval: Option<RetrievalSection>,
    generation: Option<GenerationSection>,
    ingest: Option<IngestSection>,
    api: Option<ApiSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OllamaSection {
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<u64>,
    embedding_model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexSection {
    path: Option<PathBuf>,
    collection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    top_k: Option<usize>,
    relevance_score_threshold: Option<f32>,
    max_context_tokens: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GenerationSection {
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestSection {
    documents_dir: Option<PathBuf>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ApiSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "mistral".to_string(),
            ollama_timeout: 120,
            embedding_model: "all-minilm".to_string(),
            index_path: None,
            collection_name: "office_documents".to_string(),
            retrieval_top_k: 5,
            relevance_score_threshold: 0.3,
            max_context_tokens: 1500,
            temperature: 0.1,
            documents_dir: None,
            chunk_size: 512,
            chunk_overlap: 50,
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and the process environment.
    ///
    /// # Example
    /// ```no_run
    /// use office_rag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {:?}", config.index_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `OFFICE_RAG_WORKSPACE` / `OFFICE_RAG_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace
            .or_else(|| std::env::var("OFFICE_RAG_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file = config_file
            .or_else(|| std::env::var("OFFICE_RAG_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.data_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        let mut result = self.clone();

        if let Some(ollama) = file.ollama {
            if let Some(base_url) = ollama.base_url {
                result.ollama_base_url = base_url;
            }
            if let Some(model) = ollama.model {
                result.ollama_model = model;
            }
            if let Some(timeout) = ollama.timeout {
                result.ollama_timeout = timeout;
            }
            if let Some(embedding_model) = ollama.embedding_model {
                result.embedding_model = embedding_model;
            }
        }

        if let Some(index) = file.index {
            if let Some(path) = index.path {
                result.index_path = Some(path);
            }
            if let Some(collection) = index.collection {
                result.collection_name = collection;
            }
        }

        if let Some(retrieval) = file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.retrieval_top_k = top_k;
            }
            if let Some(threshold) = retrieval.relevance_score_threshold {
                result.relevance_score_threshold = threshold;
            }
            if let Some(tokens) = retrieval.max_context_tokens {
                result.max_context_tokens = tokens;
            }
        }

        if let Some(temperature) = file.generation.and_then(|g| g.temperature) {
            result.temperature = temperature;
        }

        if let Some(ingest) = file.ingest {
            if let Some(dir) = ingest.documents_dir {
                result.documents_dir = Some(dir);
            }
            if let Some(size) = ingest.chunk_size {
                result.chunk_size = size;
            }
            if let Some(overlap) = ingest.chunk_overlap {
                result.chunk_overlap = overlap;
            }
        }

        if let Some(api) = file.api {
            if let Some(host) = api.host {
                result.api_host = host;
            }
            if let Some(port) = api.port {
                result.api_port = port;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Numeric variables that fail to parse are reported as configuration errors
    /// rather than silently ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("OLLAMA_BASE_URL") {
            self.ollama_base_url = v;
        }
        if let Some(v) = var("OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = parse_var(&var, "OLLAMA_TIMEOUT")? {
            self.ollama_timeout = v;
        }
        if let Some(v) = var("EMBEDDING_MODEL") {
            self.embedding_model = v;
        }
        if let Some(v) = var("INDEX_PATH") {
            self.index_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("COLLECTION_NAME") {
            self.collection_name = v;
        }
        if let Some(v) = parse_var(&var, "RETRIEVAL_TOP_K")? {
            self.retrieval_top_k = v;
        }
        if let Some(v) = parse_var(&var, "RELEVANCE_SCORE_THRESHOLD")? {
            self.relevance_score_threshold = v;
        }
        if let Some(v) = parse_var(&var, "MAX_CONTEXT_TOKENS")? {
            self.max_context_tokens = v;
        }
        if let Some(v) = parse_var(&var, "TEMPERATURE")? {
            self.temperature = v;
        }
        if let Some(v) = var("DOCUMENTS_DIR") {
            self.documents_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = parse_var(&var, "CHUNK_SIZE")? {
            self.chunk_size = v;
        }
        if let Some(v) = parse_var(&var, "CHUNK_OVERLAP")? {
            self.chunk_overlap = v;
        }
        if let Some(v) = var("API_HOST") {
            self.api_host = v;
        }
        if let Some(v) = parse_var(&var, "API_PORT")? {
            self.api_port = v;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        model: Option<String>,
        endpoint: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(model) = model {
            self.ollama_model = model;
        }

        if let Some(endpoint) = endpoint {
            self.ollama_base_url = endpoint;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .office-rag directory.
    pub fn data_dir(&self) -> PathBuf {
        self.workspace.join(".office-rag")
    }

    /// Resolved location of the SQLite index.
    pub fn index_path(&self) -> PathBuf {
        self.index_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join("index.sqlite"))
    }

    /// Resolved directory of source documents for ingestion.
    pub fn documents_dir(&self) -> PathBuf {
        self.documents_dir
            .clone()
            .unwrap_or_else(|| self.workspace.join("documents"))
    }

    /// Read-only retrieval settings handed to the query pipeline.
    pub fn retrieval_settings(&self) -> RetrievalSettings {
        RetrievalSettings {
            relevance_threshold: self.relevance_score_threshold,
            top_k: self.retrieval_top_k,
            context_char_budget: self.max_context_tokens.saturating_mul(CHARS_PER_TOKEN),
        }
    }

    /// Validate value ranges.
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.relevance_score_threshold) {
            return Err(AppError::Config(format!(
                "relevance_score_threshold must be within 0..1, got {}",
                self.relevance_score_threshold
            )));
        }

        if self.retrieval_top_k == 0 {
            return Err(AppError::Config(
                "retrieval_top_k must be at least 1".to_string(),
            ));
        }

        if self.max_context_tokens == 0 {
            return Err(AppError::Config(
                "max_context_tokens must be at least 1".to_string(),
            ));
        }

        if self.max_context_tokens.checked_mul(CHARS_PER_TOKEN).is_none() {
            return Err(AppError::Config(format!(
                "max_context_tokens is too large, got {}",
                self.max_context_tokens
            )));
        }

        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap must be smaller than chunk_size, got {} and {}",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be within 0..2, got {}",
                self.temperature
            )));
        }

        if self.ollama_timeout == 0 {
            return Err(AppError::Config(
                "ollama_timeout must be at least 1 second".to_string(),
            ));
        }

        if self.ollama_model.trim().is_empty() || self.ollama_base_url.trim().is_empty() {
            return Err(AppError::Config(
                "ollama_model and ollama_base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T, F>(var: &F, name: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            AppError::Config(format!("Invalid value for {}{}: {}", ENV_PREFIX, name, e))
        }),
        None => Ok(None),
    }
}

/// Retrieval parameters consumed by the query pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalSettings {
    /// Similarity threshold in 0..1.
    pub relevance_threshold: f32,

    /// Number of chunks requested from the store.
    pub top_k: usize,

    /// Maximum characters of assembled context.
    pub context_char_budget: usize,
}

impl RetrievalSettings {
    /// Threshold converted into the store's distance domain (smaller is closer).
    pub fn distance_cutoff(&self) -> f32 {
        1.0 - self.relevance_threshold
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        AppConfig::default().retrieval_settings()
    }
}
