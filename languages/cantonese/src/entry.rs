use lexi_core::de;
use lexi_core::types::{FAILED_MARKER, failed_headword};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CantoneseEntry {
    pub cantonese: String,
    /// Jyutping syllables
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
    #[serde(default)]
    pub traditional_character: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub traditional: String,
    #[serde(default)]
    pub simplified: String,
    pub transcriptions: Transcriptions,
    pub regional_variants: RegionalVariants,
    pub meanings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcriptions {
    #[serde(default)]
    pub jyutping: String,
    #[serde(default)]
    pub yale: String,
    #[serde(default)]
    pub ipa: String,
    #[serde(default)]
    pub tone_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalVariants {
    #[serde(default)]
    pub hong_kong: String,
    #[serde(default)]
    pub guangzhou: String,
    #[serde(default)]
    pub macau: String,
}

fn unknown() -> String {
    "unknown".to_string()
}

pub const ORIGINS: &[&str] = &[
    "standard_chinese",
    "classical_chinese",
    "cantonese_innovation",
    "english_loanword",
    "unknown",
];

impl CantoneseEntry {
    pub fn failed(chinese_word: &str) -> Self {
        let marker = failed_headword(chinese_word);

        Self {
            cantonese: marker.clone(),
            syllables: vec!["failed".to_string()],
            frequency: 9999,
            pos: vec!["x".to_string()],
            etymology: Etymology {
                origin: unknown(),
                source_language: unknown(),
                traditional_character: chinese_word.to_string(),
                notes: format!("Failed to generate entry for Chinese word: {chinese_word}"),
            },
            forms: vec![Form {
                traditional: marker.clone(),
                simplified: marker.clone(),
                transcriptions: Transcriptions {
                    jyutping: unknown(),
                    yale: unknown(),
                    ipa: "/unknown/".to_string(),
                    tone_pattern: unknown(),
                },
                regional_variants: RegionalVariants {
                    hong_kong: marker.clone(),
                    guangzhou: marker.clone(),
                    macau: marker,
                },
                meanings: vec![format!("Failed to generate meaning for: {chinese_word}")],
            }],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.cantonese.starts_with(FAILED_MARKER)
    }
}
