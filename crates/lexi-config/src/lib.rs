use std::env;

use serde::{Deserialize, Serialize};

use self::generation::GenerationConfig;
use self::ollama::OllamaConfig;
use self::paths::PathsConfig;

pub mod generation;
pub mod ollama;
pub mod paths;

pub use self::ollama::ApiMode;

pub(crate) type Lookup = dyn Fn(&str) -> Option<String>;

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub generation: GenerationConfig,
    pub paths: PathsConfig,
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn new() -> Self {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` knows about
    pub fn from_lookup(lookup: &Lookup) -> Self {
        let mut config = Config::default();
        config.apply_env(lookup);
        config
    }

    /// Layer environment overrides on top of a loaded config
    pub fn with_env(mut self) -> Self {
        self.apply_env(&|key| env::var(key).ok());
        self
    }

    fn apply_env(&mut self, lookup: &Lookup) {
        self.ollama.apply_env(lookup);
        self.generation.apply_env(lookup);
        self.paths.apply_env(lookup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(&|_| None);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "qwen3:latest");
        assert_eq!(config.ollama.model_base_name(), "qwen3");
        assert_eq!(config.ollama.api, ApiMode::Generate);
        assert_eq!(config.generation.max_retries, 3);
        assert_eq!(config.generation.batch_size, 3);
        assert_eq!(config.paths.raw_dir, PathBuf::from("data/raw/exclusive"));
    }

    #[test]
    fn test_env_overrides() {
        let lookup = lookup_from(&[
            ("OLLAMA_BASE_URL", "http://gpu-box:11434/"),
            ("OLLAMA_API", "Chat"),
            ("OLLAMA_TIMEOUT_SECONDS", "30"),
            ("LEXI_MAX_RETRIES", "0"),
            ("LEXI_BATCH_SIZE", "10"),
            ("LEXI_RETRY_DELAY_MS", "not-a-number"),
            ("LEXI_OUTPUT_DIR", "out"),
        ]);

        let config = Config::from_lookup(&lookup);
        assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.ollama.api, ApiMode::Chat);
        assert_eq!(config.ollama.timeout_seconds, 30);
        // At least one attempt is always made
        assert_eq!(config.generation.max_retries, 1);
        assert_eq!(config.generation.batch_size, 10);
        assert_eq!(config.generation.retry_delay_ms, 5000);
        assert_eq!(config.paths.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"ollama": {"model": "llama3:8b", "api": "chat"}}"#).unwrap();
        assert_eq!(config.ollama.model, "llama3:8b");
        assert_eq!(config.ollama.api, ApiMode::Chat);
        assert_eq!(config.ollama.timeout_seconds, 120);
        assert_eq!(config.generation.item_delay_ms, 1000);
    }
}
