use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Lookup;

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw/exclusive")
}

fn default_inclusive_dir() -> PathBuf {
    PathBuf::from("data/raw/inclusive")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/generated")
}

fn default_enriched_dir() -> PathBuf {
    PathBuf::from("data/enriched")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// HSK level files (`{level}.json`) words are generated from
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_inclusive_dir")]
    pub inclusive_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_enriched_dir")]
    pub enriched_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            inclusive_dir: default_inclusive_dir(),
            output_dir: default_output_dir(),
            enriched_dir: default_enriched_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl PathsConfig {
    pub(crate) fn apply_env(&mut self, lookup: &Lookup) {
        let fields = [
            ("LEXI_RAW_DIR", &mut self.raw_dir),
            ("LEXI_INCLUSIVE_DIR", &mut self.inclusive_dir),
            ("LEXI_OUTPUT_DIR", &mut self.output_dir),
            ("LEXI_ENRICHED_DIR", &mut self.enriched_dir),
            ("LEXI_LOG_DIR", &mut self.log_dir),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = PathBuf::from(value);
            }
        }
    }
}
