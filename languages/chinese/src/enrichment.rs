use std::time::Duration;

use lexi_core::SourceWord;
use lexi_llm::entry::{EntryError, into_entry, require_non_empty};
use lexi_llm::{GenerationOptions, GenerationOutcome, GenerationRequest, RetryPolicy, TextGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hsk::HskLevels;

const SYSTEM_PROMPT: &str = include_str!("../prompts/enrichment_system.txt");

/// Separator between alternative meanings in every language field
pub const STANDARD_SEPARATOR: &str = " ; ";

pub const FAILED_ERROR: &str = "Failed to get enriched data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedItem {
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub meanings: Vec<EnrichedMeaning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMeaning {
    #[serde(default)]
    pub chinese: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub vietnamese: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub usage_frequency: String,
    #[serde(default)]
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub chinese: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub vietnamese: String,
}

impl EnrichedItem {
    pub fn failed(item: &str, pinyin: &str) -> Self {
        Self {
            item: item.to_string(),
            pinyin: pinyin.to_string(),
            meanings: Vec::new(),
            error: Some(FAILED_ERROR.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Rewrite every meaning field to use [`STANDARD_SEPARATOR`]
    pub fn standardize(&mut self) {
        for meaning in &mut self.meanings {
            meaning.chinese = standardize_format(&meaning.chinese);
            meaning.english = standardize_format(&meaning.english);
            meaning.vietnamese = standardize_format(&meaning.vietnamese);
        }
    }
}

/// Normalize alternative separators: `" / "` and bare `;` become `" ; "`
pub fn standardize_format(text: &str) -> String {
    let mut standardized = text
        .replace(" / ", STANDARD_SEPARATOR)
        .replace(';', STANDARD_SEPARATOR);

    while standardized.contains("  ") {
        standardized = standardized.replace("  ", " ");
    }

    // Empty alternatives, "a ; ; b" after the space cleanup
    while standardized.contains("; ;") {
        standardized = standardized.replace("; ;", ";");
    }

    standardized.trim().to_string()
}

pub fn user_prompt(item: &str, pinyin: &str, hsk_level: Option<u8>) -> String {
    let mut context = format!(
        "Provide detailed meanings, Chinese definitions, English translations, Vietnamese \
         translations, and examples for this Chinese vocabulary item:\n\nItem: {item}"
    );

    if !pinyin.is_empty() {
        context.push_str(&format!("\nPinyin: {pinyin}"));
    }

    if let Some(level) = hsk_level {
        context.push_str(&format!("\nHSK Level: {level}"));
    }

    format!(
        "{context}\n\n\
         请先用中文思考这个词的含义和用法，然后再翻译。首先理解这个词在中文中的确切含义，\
         然后提供中文定义、精确的英语和越南语翻译。\n\n\
         Remember:\n\
         1. Provide Chinese definitions for each meaning (use \" ; \" between alternatives)\n\
         2. Use \" ; \" (semicolons with spaces) between alternative meanings in all languages\n\
         3. Provide complete Vietnamese translations for ALL examples\n\
         4. Include 2-4 meanings maximum, ordered by frequency of use\n\
         5. Keep examples simple (HSK1-3 level)\n\
         6. Respond ONLY with the complete JSON structure with no additional text"
    )
}

/// Accept a reply with at least one meaning; the item defaults to the requested word
pub fn validate_enriched(value: Value, item: &str) -> Result<EnrichedItem, EntryError> {
    require_non_empty(&value, "", "meanings")?;

    let mut enriched: EnrichedItem = into_entry(value)?;
    if enriched.item.trim().is_empty() {
        enriched.item = item.to_string();
    }
    enriched.error = None;
    enriched.standardize();
    Ok(enriched)
}

/// Adds meanings, translations and examples to HSK items
pub struct Enricher<G> {
    generator: G,
    policy: RetryPolicy,
    item_delay: Duration,
}

impl<G: TextGenerator> Enricher<G> {
    pub fn new(generator: G, policy: RetryPolicy, item_delay: Duration) -> Self {
        Self {
            generator,
            policy,
            item_delay,
        }
    }

    pub fn options() -> GenerationOptions {
        GenerationOptions::new(0.2).num_predict(20000)
    }

    pub async fn enrich_item(&self, word: &SourceWord, hsk_level: Option<u8>) -> EnrichedItem {
        tracing::info!("Processing vocabulary item: {}", word.chinese_word);

        let request = GenerationRequest::new(
            SYSTEM_PROMPT,
            user_prompt(&word.chinese_word, &word.pinyin, hsk_level),
        )
        .with_options(Self::options());

        let outcome = lexi_llm::generate_validated(
            &self.generator,
            &request,
            &self.policy,
            &word.chinese_word,
            &[],
            |value| validate_enriched(value, &word.chinese_word),
        )
        .await;

        match outcome {
            GenerationOutcome::Accepted { mut value, .. } => {
                if value.pinyin.is_empty() {
                    value.pinyin = word.pinyin.clone();
                }
                value
            }
            GenerationOutcome::Failed { .. } => {
                tracing::warn!("All attempts failed for {}, returning empty structure", word.chinese_word);
                EnrichedItem::failed(&word.chinese_word, &word.pinyin)
            }
        }
    }

    /// Enrich `words` in order; failed items are left out of the result
    pub async fn enrich_batch(&self, words: &[SourceWord], levels: &HskLevels) -> Vec<EnrichedItem> {
        let mut enriched = Vec::with_capacity(words.len());

        for (index, word) in words.iter().enumerate() {
            let level = levels.get_level(&word.chinese_word).map(|l| l.number());
            let item = self.enrich_item(word, level).await;

            if item.is_failed() {
                tracing::warn!("Failed to enrich: {}", word.chinese_word);
            } else {
                tracing::info!("Successfully enriched: {}", word.chinese_word);
                enriched.push(item);
            }

            if index + 1 < words.len() {
                tokio::time::sleep(self.item_delay).await;
            }
        }

        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lexi_llm::{GenerateError, ProviderMetadata};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Replies(Mutex<VecDeque<String>>);

    #[async_trait]
    impl TextGenerator for Replies {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(GenerateError::EmptyResponse)
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "replies".into(),
                model: "test".into(),
            }
        }
    }

    fn enricher(replies: &[&str]) -> Enricher<Replies> {
        let replies = replies.iter().map(|r| r.to_string()).collect();
        let policy = RetryPolicy {
            max_attempts: 2,
            retry_delay: Duration::ZERO,
            context_chars: 100,
        };
        Enricher::new(Replies(Mutex::new(replies)), policy, Duration::ZERO)
    }

    fn word(chinese: &str, pinyin: &str) -> SourceWord {
        SourceWord {
            pinyin: pinyin.to_string(),
            ..SourceWord::new(chinese)
        }
    }

    #[test]
    fn test_standardize_format() {
        assert_eq!(standardize_format("good / nice;fine"), "good ; nice ; fine");
        assert_eq!(standardize_format("好的；不错的"), "好的；不错的");
        assert_eq!(standardize_format(" tốt ;  hay ; ; được "), "tốt ; hay ; được");
        assert_eq!(standardize_format("a;;b"), "a ; b");
    }

    #[test]
    fn test_user_prompt_context() {
        let prompt = user_prompt("好", "hǎo", Some(1));
        assert!(prompt.contains("Item: 好\nPinyin: hǎo\nHSK Level: 1\n\n"));
        let prompt = user_prompt("好", "", None);
        assert!(!prompt.contains("Pinyin:"));
        assert!(!prompt.contains("HSK Level"));
    }

    #[test]
    fn test_validate_enriched() {
        let value = json!({
            "pinyin": "hǎo",
            "meanings": [{"chinese": "好的", "english": "good / nice", "vietnamese": "tốt;hay"}]
        });
        let item = validate_enriched(value, "好").unwrap();
        assert_eq!(item.item, "好");
        assert_eq!(item.meanings[0].english, "good ; nice");
        assert_eq!(item.meanings[0].vietnamese, "tốt ; hay");

        assert!(validate_enriched(json!({"item": "好", "meanings": []}), "好").is_err());
    }

    #[tokio::test]
    async fn test_enrich_batch_drops_failures() {
        let ok = r#"<think>好…</think>{"item": "好", "meanings": [{"english": "good"}]}"#;
        let enricher = enricher(&[ok, "garbage", "more garbage"]);

        let words = vec![word("好", "hǎo"), word("坏", "huài")];
        let enriched = enricher.enrich_batch(&words, &HskLevels::new()).await;

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].item, "好");
        assert_eq!(enriched[0].pinyin, "hǎo");
    }

    #[tokio::test]
    async fn test_enrich_item_failure_shape() {
        let enricher = enricher(&[]);
        let item = enricher.enrich_item(&word("坏", "huài"), Some(2)).await;
        assert!(item.is_failed());
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"item": "坏", "pinyin": "huài", "meanings": [], "error": FAILED_ERROR})
        );
    }
}
