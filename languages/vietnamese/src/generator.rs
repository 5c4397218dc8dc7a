use lexi_core::SourceWord;
use lexi_llm::entry::{
    EntryError, fill_word_template, hsk_context, into_entry, require_fields, require_non_empty,
};
use lexi_llm::{EntryGenerator, GenerationOptions};
use serde_json::Value;

use crate::entry::VietnameseEntry;

const SYSTEM_PROMPT: &str = include_str!("../prompts/system.txt");
const USER_TEMPLATE: &str = include_str!("../prompts/user.txt");
const HSK_NOTE: &str = " (consider frequency appropriate for this level)";

pub const REQUIRED_FIELDS: &[&str] = &["vietnamese", "syllables", "frequency", "pos", "etymology", "forms"];
pub const REQUIRED_FORM_FIELDS: &[&str] = &["standard", "transcriptions", "regional_variants", "meanings"];

#[derive(Debug, Clone)]
pub struct VietnameseGenerator {
    options: GenerationOptions,
}

impl VietnameseGenerator {
    pub fn new() -> Self {
        Self {
            options: GenerationOptions::new(0.3).num_predict(15000),
        }
    }

    pub fn with_options(options: GenerationOptions) -> Self {
        Self { options }
    }
}

impl Default for VietnameseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryGenerator for VietnameseGenerator {
    type Entry = VietnameseEntry;

    fn language(&self) -> &'static str {
        "vietnamese"
    }

    fn output_stem(&self) -> &'static str {
        "vietnamese_raw"
    }

    fn system_prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn user_prompt(&self, word: &SourceWord, hsk_level: Option<u8>) -> String {
        fill_word_template(USER_TEMPLATE, word, &hsk_context(hsk_level, HSK_NOTE))
    }

    fn options(&self) -> GenerationOptions {
        self.options
    }

    fn validate(&self, value: Value) -> Result<VietnameseEntry, EntryError> {
        require_fields(&value, "", REQUIRED_FIELDS)?;
        require_non_empty(&value, "", "vietnamese")?;
        require_non_empty(&value["etymology"], "etymology.", "origin")?;
        require_non_empty(&value, "", "forms")?;
        require_fields(&value["forms"][0], "forms[0].", REQUIRED_FORM_FIELDS)?;

        into_entry(value)
    }

    fn failed_entry(&self, word: &SourceWord) -> VietnameseEntry {
        VietnameseEntry::failed(&word.chinese_word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lexi_llm::{
        GenerateError, GenerationRequest, ProviderMetadata, RetryPolicy, TextGenerator, generate_entry,
    };
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn eight() -> Value {
        json!({
            "vietnamese": "tám",
            "syllables": ["tám"],
            "frequency": "12",
            "pos": ["m"],
            "etymology": {
                "origin": "native_vietnamese",
                "source_language": "unknown",
                "chu_nom": null,
                "notes": "native numeral"
            },
            "forms": [{
                "standard": "tám",
                "transcriptions": {"ipa": "/tam˨˩˦/", "simplified_pronunciation": "tam", "tone_pattern": "low_rising"},
                "regional_variants": {"northern": "tám", "central": "tám", "southern": "tám"},
                "meanings": ["eight; the number 8"]
            }]
        })
    }

    fn ba() -> SourceWord {
        SourceWord {
            pinyin: "bā".to_string(),
            meanings: vec!["eight".to_string(), "8".to_string()],
            ..SourceWord::new("八")
        }
    }

    #[test]
    fn test_validate_complete_entry() {
        let entry = VietnameseGenerator::new().validate(eight()).unwrap();
        assert_eq!(entry.vietnamese, "tám");
        assert_eq!(entry.frequency, 12);
        assert_eq!(entry.etymology.chu_nom, "null");
        assert!(!entry.is_failed());
    }

    #[test]
    fn test_validate_rejects_missing_nested_fields() {
        let generator = VietnameseGenerator::new();

        let mut value = eight();
        value["forms"][0].as_object_mut().unwrap().remove("regional_variants");
        let err = generator.validate(value).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: forms[0].regional_variants");

        let mut value = eight();
        value["etymology"]["origin"] = json!("");
        assert!(matches!(generator.validate(value), Err(EntryError::EmptyField(_))));

        let mut value = eight();
        value["forms"] = json!([]);
        assert!(matches!(generator.validate(value), Err(EntryError::EmptyField(_))));

        let mut value = eight();
        value.as_object_mut().unwrap().remove("pos");
        assert!(matches!(generator.validate(value), Err(EntryError::MissingField(_))));
    }

    #[test]
    fn test_user_prompt_fills_template() {
        let prompt = VietnameseGenerator::new().user_prompt(&ba(), Some(1));
        assert!(prompt.contains(
            "Chinese Word: 八\nPinyin: bā\nChinese Meanings: eight; 8\nHSK Level: 1 (consider frequency appropriate for this level)\n"
        ));
        assert!(prompt.contains("\"chu_nom\": \"actual_character_or_null\""));
        assert!(!prompt.contains("{chinese_word}"));
    }

    #[test]
    fn test_failed_placeholder_shape() {
        let entry = VietnameseGenerator::new().failed_entry(&ba());
        let value = serde_json::to_value(&entry).unwrap();

        assert!(entry.is_failed());
        assert_eq!(value["vietnamese"], "[FAILED: 八]");
        assert_eq!(value["frequency"], 9999);
        assert_eq!(value["pos"], json!(["x"]));
        assert_eq!(value["etymology"]["chu_nom"], "null");
        assert_eq!(value["forms"][0]["regional_variants"]["southern"], "[FAILED: 八]");
        assert_eq!(value["forms"][0]["transcriptions"]["ipa"], "/unknown/");
        assert!(lexi_core::types::is_failed_entry(&value, crate::HEADWORD_FIELD));
    }

    struct Fixed(Mutex<Vec<String>>);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
            self.0.lock().unwrap().pop().ok_or(GenerateError::EmptyResponse)
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "fixed".into(),
                model: "test".into(),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_entry_falls_back_to_placeholder() {
        let client = Fixed(Mutex::new(vec![r#"{"vietnamese": "tám"}"#.to_string()]));
        let policy = RetryPolicy::default().with_delay(Duration::ZERO);

        let generated = generate_entry(&VietnameseGenerator::new(), &client, &ba(), Some(1), &policy).await;

        assert!(generated.is_failed());
        assert_eq!(generated.attempts, 3);
        assert_eq!(generated.entry.vietnamese, "[FAILED: 八]");
    }

    #[tokio::test]
    async fn test_generate_entry_accepts_thinking_reply() {
        let reply = format!("<think>Tám là số...</think>\n{}", eight());
        let client = Fixed(Mutex::new(vec![reply]));
        let policy = RetryPolicy::default().with_delay(Duration::ZERO);

        let generated = generate_entry(&VietnameseGenerator::new(), &client, &ba(), None, &policy).await;

        assert!(!generated.is_failed());
        assert_eq!(generated.attempts, 1);
        assert_eq!(generated.entry.forms[0].standard, "tám");
    }
}
