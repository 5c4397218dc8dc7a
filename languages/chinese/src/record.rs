use lexi_core::types::DEFAULT_FREQUENCY;
use lexi_core::{SourceWord, de};
use serde::{Deserialize, Serialize};

/// One entry of an HSK level file
#[derive(Debug, Clone, Deserialize)]
pub struct HskRecord {
    pub simplified: String,
    #[serde(default)]
    pub traditional: Option<String>,
    #[serde(default = "default_frequency", deserialize_with = "de::frequency")]
    pub frequency: u32,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub pos: Vec<String>,
    #[serde(default)]
    pub forms: Vec<HskForm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HskForm {
    #[serde(default)]
    pub traditional: Option<String>,
    #[serde(default)]
    pub transcriptions: Transcriptions,
    #[serde(default)]
    pub meanings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcriptions {
    #[serde(default)]
    pub pinyin: Option<String>,
}

fn default_frequency() -> u32 {
    DEFAULT_FREQUENCY
}

/// Raw-record details attached to missing-word reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordDetails {
    pub pinyin: String,
    pub frequency: u32,
    pub pos: Vec<String>,
    pub meanings: Vec<String>,
}

impl HskRecord {
    /// First non-empty pinyin among the forms
    pub fn pinyin(&self) -> &str {
        self.forms
            .iter()
            .filter_map(|f| f.transcriptions.pinyin.as_deref())
            .find(|p| !p.trim().is_empty())
            .unwrap_or("")
    }

    /// Meanings of all forms, duplicates dropped, first occurrence order kept
    pub fn meanings(&self) -> Vec<String> {
        let mut meanings: Vec<String> = Vec::new();
        for meaning in self.forms.iter().flat_map(|f| f.meanings.iter()) {
            if !meanings.contains(meaning) {
                meanings.push(meaning.clone());
            }
        }
        meanings
    }

    pub fn traditional(&self) -> Option<&str> {
        self.traditional
            .as_deref()
            .or_else(|| self.forms.iter().find_map(|f| f.traditional.as_deref()))
    }

    pub fn to_source_word(&self) -> SourceWord {
        SourceWord {
            chinese_word: self.simplified.trim().to_string(),
            pinyin: self.pinyin().to_string(),
            meanings: self.meanings(),
            traditional: self.traditional().map(str::to_string),
            frequency: self.frequency,
            pos: self.pos.clone(),
        }
    }

    pub fn details(&self) -> WordDetails {
        WordDetails {
            pinyin: self.pinyin().to_string(),
            frequency: self.frequency,
            pos: self.pos.clone(),
            meanings: self.meanings().into_iter().take(3).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> HskRecord {
        serde_json::from_value(json!({
            "simplified": "爱",
            "radical": "爫",
            "frequency": "151",
            "pos": ["v", "n"],
            "forms": [
                {
                    "traditional": "愛",
                    "transcriptions": {"pinyin": "", "numeric": "ai4"},
                    "meanings": ["to love", "affection", "to be fond of", "to love"]
                },
                {
                    "transcriptions": {"pinyin": "ài"},
                    "meanings": ["affection", "to like"]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_pinyin_and_meanings() {
        let record = record();
        assert_eq!(record.pinyin(), "ài");
        assert_eq!(
            record.meanings(),
            vec!["to love", "affection", "to be fond of", "to like"]
        );
        assert_eq!(record.traditional(), Some("愛"));
    }

    #[test]
    fn test_to_source_word() {
        let word = record().to_source_word();
        assert_eq!(word.chinese_word, "爱");
        assert_eq!(word.frequency, 151);
        assert_eq!(word.pos, vec!["v", "n"]);
        assert_eq!(word.traditional.as_deref(), Some("愛"));
    }

    #[test]
    fn test_details_keep_three_meanings() {
        let details = record().details();
        assert_eq!(details.meanings.len(), 3);
        assert_eq!(details.pinyin, "ài");
    }

    #[test]
    fn test_minimal_record() {
        let record: HskRecord = serde_json::from_value(json!({"simplified": "八"})).unwrap();
        assert_eq!(record.pinyin(), "");
        assert!(record.meanings().is_empty());
        assert_eq!(record.frequency, DEFAULT_FREQUENCY);
    }
}
