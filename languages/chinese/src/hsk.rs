use std::collections::HashMap;

use lexi_core::LevelExtraction;

/// HSK level lookup by word
pub struct HskLevels {
    levels: HashMap<String, HskLevel>,
}

impl HskLevels {
    /// Create empty HSK database
    pub fn new() -> Self {
        Self {
            levels: HashMap::new(),
        }
    }

    /// Build from per-level extractions; a word keeps the lowest level it appears in
    pub fn from_extractions(extractions: &[LevelExtraction]) -> Self {
        let mut levels: HashMap<String, HskLevel> = HashMap::new();

        for extraction in extractions {
            let Some(level) = HskLevel::from_number(extraction.level) else {
                continue;
            };

            for word in &extraction.words {
                levels
                    .entry(word.clone())
                    .and_modify(|existing| *existing = (*existing).min(level))
                    .or_insert(level);
            }
        }

        Self { levels }
    }

    /// Get HSK level for a word
    pub fn get_level(&self, word: &str) -> Option<HskLevel> {
        self.levels.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for HskLevels {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HskLevel {
    Hsk1,
    Hsk2,
    Hsk3,
    Hsk4,
    Hsk5,
    Hsk6,
    /// Levels 7-9 of HSK 3.0 share one word list
    Hsk7,
}

impl HskLevel {
    pub const ALL: [HskLevel; 7] = [
        HskLevel::Hsk1,
        HskLevel::Hsk2,
        HskLevel::Hsk3,
        HskLevel::Hsk4,
        HskLevel::Hsk5,
        HskLevel::Hsk6,
        HskLevel::Hsk7,
    ];

    /// Parse level from "3", "hsk3" or "HSK 3"
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        let digits = s.strip_prefix("HSK").unwrap_or(&s).trim();
        digits.parse::<u8>().ok().and_then(Self::from_number)
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(HskLevel::Hsk1),
            2 => Some(HskLevel::Hsk2),
            3 => Some(HskLevel::Hsk3),
            4 => Some(HskLevel::Hsk4),
            5 => Some(HskLevel::Hsk5),
            6 => Some(HskLevel::Hsk6),
            7 => Some(HskLevel::Hsk7),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            HskLevel::Hsk1 => 1,
            HskLevel::Hsk2 => 2,
            HskLevel::Hsk3 => 3,
            HskLevel::Hsk4 => 4,
            HskLevel::Hsk5 => 5,
            HskLevel::Hsk6 => 6,
            HskLevel::Hsk7 => 7,
        }
    }

    /// Get level string
    pub fn as_str(&self) -> &'static str {
        match self {
            HskLevel::Hsk1 => "HSK1",
            HskLevel::Hsk2 => "HSK2",
            HskLevel::Hsk3 => "HSK3",
            HskLevel::Hsk4 => "HSK4",
            HskLevel::Hsk5 => "HSK5",
            HskLevel::Hsk6 => "HSK6",
            HskLevel::Hsk7 => "HSK7",
        }
    }

    /// Level name with its proficiency band, used in log lines
    pub fn description(&self) -> &'static str {
        match self {
            HskLevel::Hsk1 => "HSK1 (Beginner)",
            HskLevel::Hsk2 => "HSK2 (Elementary)",
            HskLevel::Hsk3 => "HSK3 (Intermediate)",
            HskLevel::Hsk4 => "HSK4 (Upper Intermediate)",
            HskLevel::Hsk5 => "HSK5 (Advanced)",
            HskLevel::Hsk6 => "HSK6 (Proficient)",
            HskLevel::Hsk7 => "HSK7-9 (Mastery)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(HskLevel::from_str("3"), Some(HskLevel::Hsk3));
        assert_eq!(HskLevel::from_str("hsk7"), Some(HskLevel::Hsk7));
        assert_eq!(HskLevel::from_str(" HSK 1 "), Some(HskLevel::Hsk1));
        assert_eq!(HskLevel::from_str("8"), None);
        assert_eq!(HskLevel::from_str("N5"), None);
    }

    #[test]
    fn test_description_names_band() {
        assert_eq!(HskLevel::Hsk1.description(), "HSK1 (Beginner)");
        assert!(HskLevel::Hsk7.description().starts_with("HSK7-9"));
        assert!(HskLevel::ALL.iter().all(|l| l.description().starts_with(l.as_str())));
    }

    #[test]
    fn test_levels_keep_lowest() {
        let extraction = |level: u8, words: &[&str]| LevelExtraction {
            level,
            words: words.iter().map(|w| w.to_string()).collect(),
            ..Default::default()
        };

        let levels = HskLevels::from_extractions(&[
            extraction(2, &["爱", "吧"]),
            extraction(1, &["爱"]),
            extraction(9, &["龙"]),
        ]);

        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get_level("爱"), Some(HskLevel::Hsk1));
        assert_eq!(levels.get_level("吧").map(|l| l.number()), Some(2));
        assert_eq!(levels.get_level("龙"), None);
    }
}
