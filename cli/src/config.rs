//! Application configuration.
//!
//! Loaded from a TOML file: the `--config` path when given, otherwise
//! `<config_dir>/snipsearch/config.toml` if it exists, otherwise built-in
//! defaults. Every section and field is optional.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use snipsearch_assistant::{CodeAssistant, DEFAULT_CHAT_MODEL, OpenAIChatClient};
use snipsearch_embeddings::provider::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use snipsearch_embeddings::{EmbeddingProvider, HashingProvider, OpenAIProvider};
use snipsearch_search::SearchConfig;

const APP_DIR: &str = "snipsearch";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Snippet storage.
    pub store: StoreConfig,

    /// Embedding provider.
    pub embedding: EmbeddingConfig,

    /// Semantic search.
    pub search: SearchConfig,

    /// Code analysis and suggestions.
    pub chat: ChatConfig,
}

/// Snippet storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding snippet files.
    pub root: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured root, or `<data_dir>/snipsearch/snippets`.
    pub fn resolved_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR).join("snippets"))
                .unwrap_or_else(|| PathBuf::from(".snipsearch")),
        }
    }
}

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible `/embeddings` endpoint.
    #[default]
    Openai,
    /// Offline feature hashing.
    Hashing,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend selection.
    pub provider: ProviderKind,

    /// API key. Falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,

    /// API base URL.
    pub base_url: String,

    /// Embedding model.
    pub model: String,

    /// Requested output dimensions.
    pub dimensions: Option<usize>,

    /// HTTP timeout for one request, in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Openai,
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            dimensions: None,
            timeout_secs: 30,
        }
    }
}

/// Vector size for the hashing provider when none is configured.
const DEFAULT_HASHING_DIMENSION: usize = 512;

impl EmbeddingConfig {
    /// Construct the configured provider.
    pub fn build_provider(&self) -> Arc<dyn EmbeddingProvider> {
        match self.provider {
            ProviderKind::Hashing => Arc::new(HashingProvider::new(
                self.dimensions.unwrap_or(DEFAULT_HASHING_DIMENSION),
            )),
            ProviderKind::Openai => {
                let mut provider = OpenAIProvider::new()
                    .with_base_url(&self.base_url)
                    .with_model(&self.model)
                    .with_timeout(Duration::from_secs(self.timeout_secs));
                if let Some(key) = &self.api_key {
                    provider = provider.with_api_key(key);
                }
                if let Some(dimensions) = self.dimensions {
                    provider = provider.with_dimensions(dimensions);
                }
                if !provider.is_available() {
                    warn!("No OpenAI API key configured; semantic search will fail");
                }
                Arc::new(provider)
            }
        }
    }
}

/// Chat-completion configuration. Credentials come from `[embedding]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat model.
    pub model: String,

    /// API base URL. Defaults to the embedding base URL.
    pub base_url: Option<String>,

    /// HTTP timeout for one request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Construct the code assistant.
    pub fn build_assistant(&self) -> CodeAssistant {
        let base_url = self
            .chat
            .base_url
            .as_deref()
            .unwrap_or(&self.embedding.base_url);
        let mut client = OpenAIChatClient::new()
            .with_base_url(base_url)
            .with_model(&self.chat.model)
            .with_timeout(Duration::from_secs(self.chat.timeout_secs));
        if let Some(key) = &self.embedding.api_key {
            client = client.with_api_key(key);
        }
        CodeAssistant::new(Arc::new(client))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// `<config_dir>/snipsearch/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
