use serde::{Deserialize, Serialize};

use crate::Lookup;

/// Which Ollama endpoint carries prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// `POST /api/generate` with `prompt` and `system`
    Generate,
    /// `POST /api/chat` with a system and a user message
    Chat,
}

impl ApiMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "generate" => Some(ApiMode::Generate),
            "chat" => Some(ApiMode::Chat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMode::Generate => "generate",
            ApiMode::Chat => "chat",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ApiMode::Generate => "/api/generate",
            ApiMode::Chat => "/api/chat",
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:latest".to_string()
}

fn default_api() -> ApiMode {
    ApiMode::Generate
}

fn default_timeout_seconds() -> u64 {
    120
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api")]
    pub api: ApiMode,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api: default_api(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl OllamaConfig {
    pub(crate) fn apply_env(&mut self, lookup: &Lookup) {
        if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.model = model;
        }

        if let Some(api) = lookup("OLLAMA_API").and_then(|v| ApiMode::from_str(&v)) {
            self.api = api;
        }

        if let Some(timeout) = lookup("OLLAMA_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.timeout_seconds = timeout;
        }
    }

    /// Model name without its tag, `qwen3` for `qwen3:latest`
    pub fn model_base_name(&self) -> &str {
        self.model.split(':').next().unwrap_or(&self.model)
    }
}
