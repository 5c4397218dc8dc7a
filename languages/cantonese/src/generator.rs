use lexi_core::SourceWord;
use lexi_llm::entry::{
    EntryError, fill_word_template, hsk_context, into_entry, require_fields, require_non_empty,
};
use lexi_llm::{EntryGenerator, GenerationOptions};
use serde_json::Value;

use crate::entry::CantoneseEntry;

const SYSTEM_PROMPT: &str = include_str!("../prompts/system.txt");
const USER_TEMPLATE: &str = include_str!("../prompts/user.txt");

pub const REQUIRED_FIELDS: &[&str] = &["cantonese", "syllables", "frequency", "pos", "etymology", "forms"];
pub const REQUIRED_FORM_FIELDS: &[&str] = &["traditional", "transcriptions", "regional_variants", "meanings"];

/// Cantonese entries; sampled with `top_p` since replies run long on thinking
#[derive(Debug, Clone)]
pub struct CantoneseGenerator {
    options: GenerationOptions,
}

impl CantoneseGenerator {
    pub fn new() -> Self {
        Self {
            options: GenerationOptions::new(0.3).top_p(0.9),
        }
    }
}

impl Default for CantoneseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryGenerator for CantoneseGenerator {
    type Entry = CantoneseEntry;

    fn language(&self) -> &'static str {
        "cantonese"
    }

    fn output_stem(&self) -> &'static str {
        "cantonese_raw"
    }

    fn system_prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn user_prompt(&self, word: &SourceWord, hsk_level: Option<u8>) -> String {
        fill_word_template(USER_TEMPLATE, word, &hsk_context(hsk_level, ""))
    }

    fn options(&self) -> GenerationOptions {
        self.options
    }

    fn validate(&self, value: Value) -> Result<CantoneseEntry, EntryError> {
        require_fields(&value, "", REQUIRED_FIELDS)?;
        require_non_empty(&value, "", "cantonese")?;
        require_non_empty(&value["etymology"], "etymology.", "origin")?;
        require_non_empty(&value, "", "forms")?;
        require_fields(&value["forms"][0], "forms[0].", REQUIRED_FORM_FIELDS)?;

        into_entry(value)
    }

    fn failed_entry(&self, word: &SourceWord) -> CantoneseEntry {
        CantoneseEntry::failed(&word.chinese_word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lexi_llm::{GenerateError, GenerationRequest, ProviderMetadata, RetryPolicy, TextGenerator, generate_entry};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    fn like() -> Value {
        json!({
            "cantonese": "鍾意",
            "syllables": ["zung1", "ji3"],
            "frequency": 35,
            "pos": ["v"],
            "etymology": {
                "origin": "cantonese_innovation",
                "source_language": "chinese",
                "traditional_character": "鍾意",
                "notes": "everyday Cantonese for 喜欢"
            },
            "forms": [{
                "traditional": "鍾意",
                "simplified": "钟意",
                "transcriptions": {"jyutping": "zung1 ji3", "yale": "jūng yi", "ipa": "/tsʊŋ˥ jiː˧/", "tone_pattern": "1-3"},
                "regional_variants": {"hong_kong": "鍾意", "guangzhou": "鍾意", "macau": "鍾意"},
                "meanings": ["to like", "to be fond of"]
            }]
        })
    }

    fn xihuan() -> SourceWord {
        SourceWord {
            pinyin: "xǐhuan".to_string(),
            meanings: vec!["to like".to_string()],
            ..SourceWord::new("喜欢")
        }
    }

    #[test]
    fn test_validate() {
        let generator = CantoneseGenerator::new();
        let entry = generator.validate(like()).unwrap();
        assert_eq!(entry.forms[0].transcriptions.jyutping, "zung1 ji3");

        let mut value = like();
        value["forms"][0].as_object_mut().unwrap().remove("traditional");
        assert_eq!(
            generator.validate(value).unwrap_err().to_string(),
            "Missing field: forms[0].traditional"
        );

        let mut value = like();
        value["etymology"] = json!({});
        assert!(generator.validate(value).is_err());
    }

    #[test]
    fn test_chat_style_options() {
        let options = CantoneseGenerator::new().options();
        assert_eq!(options.top_p, Some(0.9));
        assert_eq!(options.num_predict, None);
    }

    #[test]
    fn test_user_prompt() {
        let prompt = CantoneseGenerator::new().user_prompt(&xihuan(), Some(2));
        assert!(prompt.contains("Chinese Word: 喜欢\nPinyin: xǐhuan\nChinese Meanings: to like\nHSK Level: 2"));
        assert!(!prompt.contains("consider frequency"));
    }

    struct Replies(Mutex<VecDeque<String>>);

    #[async_trait]
    impl TextGenerator for Replies {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
            self.0.lock().unwrap().pop_front().ok_or(GenerateError::EmptyResponse)
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "replies".into(),
                model: "test".into(),
            }
        }
    }

    #[tokio::test]
    async fn test_repaired_reply_after_rejection() {
        // Second reply is missing a comma and has a trailing one
        let broken = like()
            .to_string()
            .replacen(",\"frequency\"", "\n\"frequency\"", 1)
            .replacen("\"ji3\"]", "\"ji3\",]", 1);
        let client = Replies(Mutex::new(VecDeque::from(vec![
            "<think>諗吓先</think>not json at all".to_string(),
            broken,
        ])));
        let policy = RetryPolicy::default().with_delay(Duration::ZERO);

        let generated = generate_entry(&CantoneseGenerator::new(), &client, &xihuan(), Some(2), &policy).await;

        assert!(!generated.is_failed());
        assert_eq!(generated.attempts, 2);
        assert_eq!(generated.entry.cantonese, "鍾意");
    }
}
