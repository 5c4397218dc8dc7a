pub mod entry;
pub mod ollama;
pub mod repair;
pub mod retry;

use serde::Serialize;

pub use entry::{EntryError, EntryGenerator, GeneratedEntry, generate_entry};
pub use ollama::OllamaClient;
pub use repair::{JsonRecovery, RecoveryMethod, extract_and_repair_json, recover_json};
pub use retry::{GenerationOutcome, RetryPolicy, generate_validated};

/// Text generation backend interface
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one prompt and return the raw reply text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Sampling options forwarded as Ollama `options`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            num_predict: None,
            top_p: None,
        }
    }
}

impl GenerationOptions {
    pub fn new(temperature: f32) -> Self {
        Self {
            temperature,
            ..Default::default()
        }
    }

    pub fn num_predict(mut self, tokens: u32) -> Self {
        self.num_predict = Some(tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Model {model} not found (available: {})", .available.join(", "))]
    ModelNotFound {
        model: String,
        available: Vec<String>,
    },

    #[error("Empty response")]
    EmptyResponse,
}
