use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::preprocess::normalize_word;
use crate::types::{LevelExtraction, is_failed_entry};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Deserialize a whole JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Load a file whose top level must be an array of records
pub fn load_records(path: &Path) -> Result<Vec<Value>, LoadError> {
    match load_json::<Value>(path)? {
        Value::Array(records) => Ok(records),
        other => Err(LoadError::InvalidFormat(format!(
            "{}: expected a JSON array, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Pretty-print `value` to `path`, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Collect the `field` headword of every record, skipping placeholders
pub fn collect_words(records: &[Value], field: &str) -> Vec<String> {
    records
        .iter()
        .filter(|record| !is_failed_entry(record, field))
        .filter_map(|record| record.get(field).and_then(Value::as_str))
        .map(normalize_word)
        .filter(|word| !word.is_empty())
        .collect()
}

/// Extract headwords from one level file, recording failures instead of returning them
pub fn extract_level_file(path: &Path, level: u8, field: &str) -> LevelExtraction {
    let mut extraction = LevelExtraction {
        level,
        path: path.to_path_buf(),
        ..Default::default()
    };

    match load_records(path) {
        Ok(records) => {
            extraction.total_entries = records.len();
            extraction.words = collect_words(&records, field);
            tracing::info!(
                "Level {}: extracted {} words from {} entries",
                level,
                extraction.words.len(),
                extraction.total_entries
            );
        }
        Err(e) => {
            tracing::warn!("Level {}: {}", level, e);
            extraction.error = Some(e.to_string());
        }
    }

    extraction
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
