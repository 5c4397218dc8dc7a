use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::LevelExtraction;

/// Words of a dataset grouped by level
pub type LevelWords = BTreeMap<u8, BTreeSet<String>>;

pub fn level_words(extractions: &[LevelExtraction]) -> LevelWords {
    let mut by_level = LevelWords::new();
    for extraction in extractions {
        by_level
            .entry(extraction.level)
            .or_default()
            .extend(extraction.words.iter().cloned());
    }
    by_level
}

/// Cross-level view of one dataset
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelAnalysis {
    pub total_words: usize,
    pub unique_words: Vec<String>,
    pub words_per_level: BTreeMap<u8, usize>,
    /// Words listed under more than one level, with those levels in order
    pub duplicates: BTreeMap<String, Vec<u8>>,
    pub failed_levels: Vec<u8>,
}

pub fn analyze_levels(extractions: &[LevelExtraction]) -> LevelAnalysis {
    let mut analysis = LevelAnalysis::default();
    let mut seen: BTreeMap<&str, BTreeSet<u8>> = BTreeMap::new();

    for extraction in extractions {
        if !extraction.is_ok() {
            analysis.failed_levels.push(extraction.level);
            continue;
        }

        analysis.total_words += extraction.words.len();
        *analysis.words_per_level.entry(extraction.level).or_default() += extraction.words.len();

        for word in &extraction.words {
            seen.entry(word.as_str()).or_default().insert(extraction.level);
        }
    }

    analysis.unique_words = seen.keys().map(|w| w.to_string()).collect();
    analysis.duplicates = seen
        .into_iter()
        .filter(|(_, levels)| levels.len() > 1)
        .map(|(word, levels)| (word.to_string(), levels.into_iter().collect()))
        .collect();

    analysis
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetComparison {
    pub common: Vec<String>,
    pub left_only: Vec<String>,
    pub right_only: Vec<String>,
}

impl SetComparison {
    pub fn between(left: &BTreeSet<String>, right: &BTreeSet<String>) -> Self {
        Self {
            common: left.intersection(right).cloned().collect(),
            left_only: left.difference(right).cloned().collect(),
            right_only: right.difference(left).cloned().collect(),
        }
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (self.common.len(), self.left_only.len(), self.right_only.len())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetComparison {
    pub left: String,
    pub right: String,
    pub overall: SetComparison,
    pub per_level: BTreeMap<u8, SetComparison>,
}

/// Compare two datasets overall and level by level.
///
/// A level present on only one side compares against an empty set.
pub fn compare_datasets(
    left_label: &str,
    left: &LevelWords,
    right_label: &str,
    right: &LevelWords,
) -> DatasetComparison {
    let flatten = |words: &LevelWords| -> BTreeSet<String> {
        words.values().flat_map(|set| set.iter().cloned()).collect()
    };

    let empty = BTreeSet::new();
    let levels: BTreeSet<u8> = left.keys().chain(right.keys()).copied().collect();
    let per_level = levels
        .into_iter()
        .map(|level| {
            let l = left.get(&level).unwrap_or(&empty);
            let r = right.get(&level).unwrap_or(&empty);
            (level, SetComparison::between(l, r))
        })
        .collect();

    DatasetComparison {
        left: left_label.to_string(),
        right: right_label.to_string(),
        overall: SetComparison::between(&flatten(left), &flatten(right)),
        per_level,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelDiff {
    /// In the expected set, absent from the actual one
    pub missing: Vec<String>,
    /// In the actual set only
    pub extra: Vec<String>,
}

/// Per-level words that `actual` lacks or adds relative to `expected`
pub fn find_missing(expected: &LevelWords, actual: &LevelWords) -> BTreeMap<u8, LevelDiff> {
    let empty = BTreeSet::new();
    expected
        .keys()
        .chain(actual.keys())
        .copied()
        .collect::<BTreeSet<u8>>()
        .into_iter()
        .map(|level| {
            let cmp = SetComparison::between(
                expected.get(&level).unwrap_or(&empty),
                actual.get(&level).unwrap_or(&empty),
            );
            (
                level,
                LevelDiff {
                    missing: cmp.left_only,
                    extra: cmp.right_only,
                },
            )
        })
        .collect()
}
