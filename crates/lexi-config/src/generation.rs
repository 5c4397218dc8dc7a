use serde::{Deserialize, Serialize};

use crate::Lookup;

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_item_delay_ms() -> u64 {
    1000
}

fn default_batch_delay_ms() -> u64 {
    5000
}

fn default_batch_size() -> usize {
    3
}

fn default_context_chars() -> usize {
    4000
}

/// Retry budget and pacing for LLM batch jobs
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    /// Attempts per item, the first call included
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Pause between two items of a batch
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// How much of a rejected reply is quoted back in a retry prompt
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            item_delay_ms: default_item_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            batch_size: default_batch_size(),
            context_chars: default_context_chars(),
        }
    }
}

impl GenerationConfig {
    pub(crate) fn apply_env(&mut self, lookup: &Lookup) {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(v) = parse("LEXI_MAX_RETRIES") {
            self.max_retries = v.max(1) as u32;
        }

        if let Some(v) = parse("LEXI_RETRY_DELAY_MS") {
            self.retry_delay_ms = v;
        }

        if let Some(v) = parse("LEXI_ITEM_DELAY_MS") {
            self.item_delay_ms = v;
        }

        if let Some(v) = parse("LEXI_BATCH_DELAY_MS") {
            self.batch_delay_ms = v;
        }

        if let Some(v) = parse("LEXI_BATCH_SIZE") {
            self.batch_size = (v as usize).max(1);
        }
    }
}
