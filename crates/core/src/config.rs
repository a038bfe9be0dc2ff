//! Configuration management for the Jobs assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults (the deployed policy + job-posting setup)
//! - Config file (`.jobs/config.yaml` in the workspace, or `JOBS_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Credentials are never stored in the file itself; the file names the
//! environment variables that hold them (`apiKeyEnv`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Tolerance used when checking that corpus weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Environment variable read for an index key when a corpus names none.
pub const DEFAULT_INDEX_KEY_ENV: &str = "PINECONE_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .jobs/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("gemini", "ollama")
    pub provider: String,

    /// Model identifier for the active provider
    pub model: String,

    /// Sampling temperature for answer generation
    pub temperature: f32,

    /// Explicit API key override for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format ("pretty" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: LlmConfig,

    /// Query embedding configuration shared by all corpora
    pub embedding: EmbeddingConfig,

    /// Corpus connections queried for every question
    pub corpora: Vec<CorpusConfig>,

    /// Fusion settings
    pub retrieval: RetrievalConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Prompt definition identifier
    pub prompt_id: String,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Upper bound on generated tokens; provider default when unset
    #[serde(rename = "maxTokens", default)]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            "gemini".to_string(),
            ProviderConfig::Gemini {
                api_key_env: "GOOGLE_API_KEY".to_string(),
                model: "gemini-2.0-flash-exp".to_string(),
                endpoint: None,
            },
        );
        providers.insert(
            "ollama".to_string(),
            ProviderConfig::Ollama {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2".to_string(),
                timeout: Some(60),
            },
        );

        Self {
            active_provider: "gemini".to_string(),
            temperature: Some(0.0),
            max_tokens: None,
            providers,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } => model,
            Self::Ollama { model, .. } => model,
        }
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Gemini { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Embedding model used to vectorize the search query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "openai", "ollama", "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
        }
    }
}

/// One searchable corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusConfig {
    /// Corpus identifier, used in logs
    pub name: String,

    /// Backend: "pinecone" or "memory"
    #[serde(default = "default_corpus_provider")]
    pub provider: String,

    /// Index host URL (pinecone)
    #[serde(default)]
    pub host: Option<String>,

    /// Environment variable holding the index host URL (pinecone)
    #[serde(rename = "hostEnv", default)]
    pub host_env: Option<String>,

    /// Environment variable holding the index API key (pinecone)
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,

    /// Namespace inside the index
    #[serde(default)]
    pub namespace: Option<String>,

    /// JSONL file with pre-embedded records (memory)
    #[serde(rename = "dataPath", default)]
    pub data_path: Option<PathBuf>,

    /// Metadata field carrying the primary document text
    #[serde(rename = "textKey")]
    pub text_key: String,

    /// Number of documents requested per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Fusion weight
    pub weight: f64,

    /// Metadata keys documents of this corpus are expected to carry
    #[serde(rename = "metadataKeys", default)]
    pub metadata_keys: Vec<String>,
}

fn default_corpus_provider() -> String {
    "pinecone".to_string()
}

fn default_k() -> usize {
    3
}

impl CorpusConfig {
    /// Resolve the index host from `host` or `hostEnv`.
    pub fn resolve_host(&self) -> Option<String> {
        self.host.clone().or_else(|| {
            self.host_env
                .as_ref()
                .and_then(|var| std::env::var(var).ok())
        })
    }

    /// Environment variable holding the index API key.
    pub fn api_key_var(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_INDEX_KEY_ENV)
    }

    fn policy_default() -> Self {
        Self {
            name: "policy-chatbot".to_string(),
            provider: default_corpus_provider(),
            host: None,
            host_env: Some("PINECONE_POLICY_HOST".to_string()),
            api_key_env: Some(DEFAULT_INDEX_KEY_ENV.to_string()),
            namespace: None,
            data_path: None,
            text_key: "embedding_text".to_string(),
            k: default_k(),
            weight: 0.5,
            metadata_keys: vec![
                "policy_name".to_string(),
                "target_audience".to_string(),
                "apply_method".to_string(),
            ],
        }
    }

    fn job_default() -> Self {
        Self {
            name: "job-postings-index".to_string(),
            provider: default_corpus_provider(),
            host: None,
            host_env: Some("PINECONE_JOB_HOST".to_string()),
            api_key_env: Some(DEFAULT_INDEX_KEY_ENV.to_string()),
            namespace: None,
            data_path: None,
            text_key: "context_text".to_string(),
            k: default_k(),
            weight: 0.5,
            metadata_keys: vec![
                "title".to_string(),
                "job_category".to_string(),
                "apply_end_date".to_string(),
                "apply_method".to_string(),
                "apply_link".to_string(),
            ],
        }
    }
}

/// Rank fusion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Rank offset `C` in `w / (rank + C)`
    #[serde(rename = "rrfConstant", default = "default_rrf_constant")]
    pub rrf_constant: f64,

    /// Metadata key identifying the same logical document across corpora.
    /// When unset, documents are identified by their content.
    #[serde(rename = "idKey", default)]
    pub id_key: Option<String>,
}

fn default_rrf_constant() -> f64 {
    60.0
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_constant: default_rrf_constant(),
            id_key: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS origins; `*` allows any origin
    #[serde(rename = "allowedOrigins", default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_origins(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embedding: Option<EmbeddingConfig>,
    corpora: Option<Vec<CorpusConfig>>,
    retrieval: Option<RetrievalConfig>,
    server: Option<ServerConfig>,
    prompt: Option<PromptConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptConfig {
    id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let llm = LlmConfig::default();
        let model = llm
            .providers
            .get(&llm.active_provider)
            .map(|p| p.model().to_string())
            .unwrap_or_default();

        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: llm.active_provider.clone(),
            model,
            temperature: llm.temperature.unwrap_or(0.0),
            api_key: None,
            log_level: None,
            log_format: "pretty".to_string(),
            verbose: false,
            no_color: false,
            llm,
            embedding: EmbeddingConfig::default(),
            corpora: vec![CorpusConfig::policy_default(), CorpusConfig::job_default()],
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
            prompt_id: "jobs.answer.default".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `JOBS_WORKSPACE`: Override workspace path
    /// - `JOBS_CONFIG`: Path to config file
    /// - `JOBS_PROVIDER`: LLM provider
    /// - `JOBS_MODEL`: Model identifier
    /// - `JOBS_API_KEY`: LLM API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, with explicit workspace / config file taking
    /// precedence over the environment.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("JOBS_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("JOBS_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.jobs_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("JOBS_PROVIDER") {
            config.set_provider(provider);
        }

        if let Ok(model) = std::env::var("JOBS_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("JOBS_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }
            result.llm = llm;
            let active = result.llm.active_provider.clone();
            result.set_provider(active);
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(corpora) = config_file.corpora {
            result.corpora = corpora;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(id) = config_file.prompt.and_then(|p| p.id) {
            result.prompt_id = id;
        }

        Ok(result)
    }

    /// Switch the active provider, picking up its configured model.
    fn set_provider(&mut self, provider: String) {
        if let Some(provider_config) = self.llm.providers.get(&provider) {
            self.model = provider_config.model().to_string();
        }
        self.provider = provider;
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.set_provider(provider);
        }

        if let Some(model) = model {
            self.model = model;
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

    /// Get the path to the .jobs directory.
    pub fn jobs_dir(&self) -> PathBuf {
        self.workspace.join(".jobs")
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(provider)
    }

    /// Resolve the LLM API key from `JOBS_API_KEY` or the provider's `apiKeyEnv`.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::Gemini { api_key_env, .. } => std::env::var(api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Resolve the embedding API key from the configured environment variable.
    pub fn resolve_embedding_api_key(&self) -> Option<String> {
        self.embedding
            .api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Parsed `logging.format`.
    pub fn log_format(&self) -> AppResult<LogFormat> {
        LogFormat::parse(&self.log_format).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown log format: {}. Supported: pretty, text, json",
                self.log_format
            ))
        })
    }

    /// Validate configuration for the active provider and all corpora,
    /// including that every credential and index host resolves.
    pub fn validate(&self) -> AppResult<()> {
        self.log_format()?;

        let known_providers = ["gemini", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if let Some(ProviderConfig::Gemini { api_key_env, .. }) =
            self.get_provider_config(&self.provider)
        {
            if self.api_key.is_none() && std::env::var(api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        let known_embedders = ["openai", "ollama", "mock"];
        if !known_embedders.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedders.join(", ")
            )));
        }

        if self.embedding.provider == "openai" && self.resolve_embedding_api_key().is_none() {
            return Err(AppError::Config(format!(
                "Embedding API key not found in environment variable: {}",
                self.embedding.api_key_env.as_deref().unwrap_or("(apiKeyEnv not set)")
            )));
        }

        self.validate_corpora()?;
        self.validate_index_access()
    }

    /// Check that every remote corpus has a reachable host and an API key.
    fn validate_index_access(&self) -> AppResult<()> {
        for corpus in self.corpora.iter().filter(|c| c.provider == "pinecone") {
            if corpus.resolve_host().is_none() {
                return Err(AppError::Config(format!(
                    "No index host for corpus '{}' (set host or {})",
                    corpus.name,
                    corpus.host_env.as_deref().unwrap_or("hostEnv")
                )));
            }

            let key_var = corpus.api_key_var();
            if std::env::var(key_var).is_err() {
                return Err(AppError::Config(format!(
                    "API key for corpus '{}' not found in environment variable: {}",
                    corpus.name, key_var
                )));
            }
        }

        Ok(())
    }

    /// Validate corpus definitions and fusion weights.
    pub fn validate_corpora(&self) -> AppResult<()> {
        if self.corpora.is_empty() {
            return Err(AppError::Config("At least one corpus must be configured".to_string()));
        }

        for corpus in &self.corpora {
            if corpus.k == 0 {
                return Err(AppError::Config(format!(
                    "Corpus '{}' must request at least one document (k > 0)",
                    corpus.name
                )));
            }
            if corpus.weight.is_nan() || corpus.weight < 0.0 {
                return Err(AppError::Config(format!(
                    "Corpus '{}' has invalid weight {}",
                    corpus.name, corpus.weight
                )));
            }
            match corpus.provider.as_str() {
                "pinecone" => {
                    if corpus.host.is_none() && corpus.host_env.is_none() {
                        return Err(AppError::Config(format!(
                            "Corpus '{}' needs either host or hostEnv",
                            corpus.name
                        )));
                    }
                }
                "memory" => {
                    if corpus.data_path.is_none() {
                        return Err(AppError::Config(format!(
                            "Corpus '{}' needs a dataPath",
                            corpus.name
                        )));
                    }
                }
                other => {
                    return Err(AppError::Config(format!(
                        "Corpus '{}' has unknown provider '{}'. Supported: pinecone, memory",
                        corpus.name, other
                    )));
                }
            }
        }

        let total: f64 = self.corpora.iter().map(|c| c.weight).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::Config(format!(
                "Corpus weights must sum to 1.0 (got {})",
                total
            )));
        }

        if self.retrieval.rrf_constant <= 0.0 {
            return Err(AppError::Config(format!(
                "rrfConstant must be positive (got {})",
                self.retrieval.rrf_constant
            )));
        }

        Ok(())
    }
}
