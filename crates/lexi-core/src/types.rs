use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Prefix carried by every placeholder produced for a failed generation
pub const FAILED_MARKER: &str = "[FAILED:";

/// Default frequency rank for source words without one
pub const DEFAULT_FREQUENCY: u32 = 1000;

/// A Chinese headword handed to a generator or enricher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceWord {
    pub chinese_word: String,
    pub pinyin: String,
    pub meanings: Vec<String>,
    #[serde(default)]
    pub traditional: Option<String>,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub pos: Vec<String>,
}

fn default_frequency() -> u32 {
    DEFAULT_FREQUENCY
}

impl SourceWord {
    pub fn new(chinese_word: impl Into<String>) -> Self {
        Self {
            chinese_word: chinese_word.into(),
            pinyin: String::new(),
            meanings: Vec::new(),
            traditional: None,
            frequency: DEFAULT_FREQUENCY,
            pos: Vec::new(),
        }
    }

    /// Meanings joined the way prompts present them
    pub fn joined_meanings(&self) -> String {
        self.meanings.join("; ")
    }

    /// Headword used in placeholder entries
    pub fn failed_headword(&self) -> String {
        failed_headword(&self.chinese_word)
    }
}

pub fn failed_headword(word: &str) -> String {
    format!("{FAILED_MARKER} {word}]")
}

/// Words pulled from one level file.
///
/// Extraction never fails outright: problems with the file are kept in
/// `error` so a run over several levels can carry on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelExtraction {
    pub level: u8,
    pub path: PathBuf,
    pub words: Vec<String>,
    pub total_entries: usize,
    pub error: Option<String>,
}

impl LevelExtraction {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// True for placeholder entries and enrichment results that carry an error.
///
/// `headword_field` names the key holding the entry's headword
/// (`vietnamese`, `cantonese`, `item`, ...).
pub fn is_failed_entry(entry: &serde_json::Value, headword_field: &str) -> bool {
    if entry.get("error").is_some() {
        return true;
    }

    entry
        .get(headword_field)
        .and_then(|v| v.as_str())
        .is_some_and(|s| s.starts_with(FAILED_MARKER))
}
