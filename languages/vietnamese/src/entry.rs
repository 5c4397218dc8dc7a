use lexi_core::de;
use serde::{Deserialize, Serialize};

/// Generated Vietnamese counterpart of an HSK word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VietnameseEntry {
    pub vietnamese: String,
    pub syllables: Vec<String>,
    #[serde(deserialize_with = "de::frequency")]
    pub frequency: u32,
    #[serde(deserialize_with = "de::one_or_many")]
    pub pos: Vec<String>,
    pub etymology: Etymology,
    pub forms: Vec<Form>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Etymology {
    pub origin: String,
    #[serde(default = "unknown")]
    pub source_language: String,
    /// Chữ Nôm spelling, the text "null" when none exists
    #[serde(default = "null_text", deserialize_with = "de::null_as_text")]
    pub chu_nom: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub standard: String,
    pub transcriptions: Transcriptions,
    pub regional_variants: RegionalVariants,
    pub meanings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcriptions {
    #[serde(default)]
    pub ipa: String,
    #[serde(default)]
    pub simplified_pronunciation: String,
    #[serde(default)]
    pub tone_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalVariants {
    #[serde(default)]
    pub northern: String,
    #[serde(default)]
    pub central: String,
    #[serde(default)]
    pub southern: String,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn null_text() -> String {
    "null".to_string()
}

/// Etymology origins the generator may report
pub const ORIGINS: &[&str] = &[
    "native_vietnamese",
    "sino_vietnamese",
    "french_loanword",
    "khmer_loanword",
    "cham_loanword",
    "unknown",
];

impl VietnameseEntry {
    /// Placeholder written when generation failed for `chinese_word`
    pub fn failed(chinese_word: &str) -> Self {
        let marker = lexi_core::types::failed_headword(chinese_word);

        Self {
            vietnamese: marker.clone(),
            syllables: vec!["failed".to_string()],
            frequency: 9999,
            pos: vec!["x".to_string()],
            etymology: Etymology {
                origin: unknown(),
                source_language: unknown(),
                chu_nom: null_text(),
                notes: format!("Failed to generate entry for Chinese word: {chinese_word}"),
            },
            forms: vec![Form {
                standard: marker.clone(),
                transcriptions: Transcriptions {
                    ipa: "/unknown/".to_string(),
                    simplified_pronunciation: unknown(),
                    tone_pattern: unknown(),
                },
                regional_variants: RegionalVariants {
                    northern: marker.clone(),
                    central: marker.clone(),
                    southern: marker,
                },
                meanings: vec![format!("Failed to generate meaning for {chinese_word}")],
            }],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.vietnamese.starts_with(lexi_core::types::FAILED_MARKER)
    }
}
