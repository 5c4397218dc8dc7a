use lexi_core::SourceWord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::retry::{GenerationOutcome, RetryPolicy, generate_validated};
use crate::{GenerationOptions, GenerationRequest, TextGenerator};

#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Empty field: {0}")]
    EmptyField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// A target language the pipeline can generate vocabulary entries for
pub trait EntryGenerator: Send + Sync {
    type Entry: Serialize + Send;

    /// Language name used in logs and file names ("vietnamese")
    fn language(&self) -> &'static str;

    /// Output files are `{stem}_{level}.json`
    fn output_stem(&self) -> &'static str;

    fn system_prompt(&self) -> &str;

    fn user_prompt(&self, word: &SourceWord, hsk_level: Option<u8>) -> String;

    fn options(&self) -> GenerationOptions;

    /// Turn a recovered object into an entry, rejecting incomplete ones
    fn validate(&self, value: Value) -> Result<Self::Entry, EntryError>;

    /// Placeholder written when every attempt failed
    fn failed_entry(&self, word: &SourceWord) -> Self::Entry;

    fn request(&self, word: &SourceWord, hsk_level: Option<u8>) -> GenerationRequest {
        GenerationRequest::new(self.system_prompt(), self.user_prompt(word, hsk_level))
            .with_options(self.options())
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedEntry<E> {
    pub entry: E,
    pub attempts: u32,
    /// Set when `entry` is a placeholder
    pub failure: Option<String>,
}

impl<E> GeneratedEntry<E> {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Generate one entry, substituting the placeholder when all attempts fail
pub async fn generate_entry<G: EntryGenerator>(
    generator: &G,
    client: &dyn TextGenerator,
    word: &SourceWord,
    hsk_level: Option<u8>,
    policy: &RetryPolicy,
) -> GeneratedEntry<G::Entry> {
    let request = generator.request(word, hsk_level);
    let outcome = generate_validated(client, &request, policy, &word.chinese_word, &[], |value| {
        generator.validate(value)
    })
    .await;

    match outcome {
        GenerationOutcome::Accepted { value, attempts } => GeneratedEntry {
            entry: value,
            attempts,
            failure: None,
        },
        GenerationOutcome::Failed { attempts, reason } => {
            tracing::warn!(
                "Using placeholder {} entry for {}",
                generator.language(),
                word.chinese_word
            );
            GeneratedEntry {
                entry: generator.failed_entry(word),
                attempts,
                failure: Some(reason),
            }
        }
    }
}

/// `\nHSK Level: n` followed by `note`, or nothing without a level
pub fn hsk_context(hsk_level: Option<u8>, note: &str) -> String {
    hsk_level
        .map(|level| format!("\nHSK Level: {level}{note}"))
        .unwrap_or_default()
}

/// Fill `{chinese_word}`, `{chinese_pinyin}`, `{chinese_meanings}` and `{hsk_context}`
pub fn fill_word_template(template: &str, word: &SourceWord, hsk_context: &str) -> String {
    template
        .replace("{chinese_word}", &word.chinese_word)
        .replace("{chinese_pinyin}", &word.pinyin)
        .replace("{chinese_meanings}", &word.joined_meanings())
        .replace("{hsk_context}", hsk_context)
}

/// Every field must be present and not null
pub fn require_fields(value: &Value, scope: &str, fields: &[&str]) -> Result<(), EntryError> {
    for field in fields {
        if value.get(field).is_none_or(Value::is_null) {
            return Err(EntryError::MissingField(format!("{scope}{field}")));
        }
    }
    Ok(())
}

/// The field must be a non-empty string or array
pub fn require_non_empty(value: &Value, scope: &str, field: &str) -> Result<(), EntryError> {
    let empty = match value.get(field) {
        None | Some(Value::Null) => return Err(EntryError::MissingField(format!("{scope}{field}"))),
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    };

    if empty {
        return Err(EntryError::EmptyField(format!("{scope}{field}")));
    }
    Ok(())
}

/// Deserialize after the structural checks passed
pub fn into_entry<T: DeserializeOwned>(value: Value) -> Result<T, EntryError> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_word_template() {
        let word = SourceWord {
            pinyin: "bā".to_string(),
            meanings: vec!["eight".to_string(), "8".to_string()],
            ..SourceWord::new("八")
        };
        let template = "W: {chinese_word}\nP: {chinese_pinyin}\nM: {chinese_meanings}{hsk_context}";

        assert_eq!(
            fill_word_template(template, &word, &hsk_context(Some(1), "")),
            "W: 八\nP: bā\nM: eight; 8\nHSK Level: 1"
        );
        assert_eq!(
            fill_word_template(template, &word, &hsk_context(Some(3), " (mind the level)")),
            "W: 八\nP: bā\nM: eight; 8\nHSK Level: 3 (mind the level)"
        );
        assert_eq!(
            fill_word_template(template, &word, &hsk_context(None, " (mind the level)")),
            "W: 八\nP: bā\nM: eight; 8"
        );
    }

    #[test]
    fn test_require_fields() {
        let value = json!({"a": 1, "b": null});
        assert!(require_fields(&value, "", &["a"]).is_ok());
        let err = require_fields(&value, "forms[0].", &["a", "b"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: forms[0].b");
    }

    #[test]
    fn test_require_non_empty() {
        let value = json!({"s": " ", "a": [], "full": ["x"], "n": 0});
        assert!(matches!(require_non_empty(&value, "", "s"), Err(EntryError::EmptyField(_))));
        assert!(matches!(require_non_empty(&value, "", "a"), Err(EntryError::EmptyField(_))));
        assert!(matches!(require_non_empty(&value, "", "x"), Err(EntryError::MissingField(_))));
        assert!(require_non_empty(&value, "", "full").is_ok());
        assert!(require_non_empty(&value, "", "n").is_ok());
    }
}
