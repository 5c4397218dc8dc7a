use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lexi_core::compare::{LevelWords, find_missing, level_words};
use lexi_core::dataset::extract_level_file;
use serde::Serialize;

use crate::hsk::HskLevel;
use crate::loader::HskLoader;
use crate::record::WordDetails;

#[derive(Debug, Clone, Serialize)]
pub struct MissingWord {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<WordDetails>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelMissing {
    pub level: u8,
    pub raw_count: usize,
    pub enriched_count: usize,
    pub missing: Vec<MissingWord>,
    pub extra: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MissingReport {
    pub total_missing: usize,
    pub total_extra: usize,
    pub levels: Vec<LevelMissing>,
}

pub fn enriched_path(dir: &Path, level: HskLevel) -> PathBuf {
    dir.join(format!("hsk{}_enriched.json", level.number()))
}

/// Words of the raw HSK lists that never made it into the enriched files
pub fn missing_report(loader: &HskLoader, enriched_dir: &Path) -> MissingReport {
    let raw = loader.extract_all();
    let enriched: Vec<_> = HskLevel::ALL
        .iter()
        .map(|level| extract_level_file(&enriched_path(enriched_dir, *level), level.number(), "item"))
        .collect();

    let raw_words: LevelWords = level_words(&raw);
    let enriched_words: LevelWords = level_words(&enriched);
    let diffs = find_missing(&raw_words, &enriched_words);

    let mut report = MissingReport::default();

    for level in HskLevel::ALL {
        let n = level.number();
        let diff = diffs.get(&n).cloned().unwrap_or_default();

        let details: HashMap<String, WordDetails> = if diff.missing.is_empty() {
            HashMap::new()
        } else {
            loader
                .load_level(level)
                .map(|records| {
                    records
                        .iter()
                        .map(|r| (r.simplified.trim().to_string(), r.details()))
                        .collect()
                })
                .unwrap_or_default()
        };

        let errors = raw
            .iter()
            .chain(enriched.iter())
            .filter(|e| e.level == n)
            .filter_map(|e| e.error.clone())
            .collect();

        let entry = LevelMissing {
            level: n,
            raw_count: raw_words.get(&n).map_or(0, |w| w.len()),
            enriched_count: enriched_words.get(&n).map_or(0, |w| w.len()),
            missing: diff
                .missing
                .into_iter()
                .map(|word| MissingWord {
                    details: details.get(&word).cloned(),
                    word,
                })
                .collect(),
            extra: diff.extra,
            errors,
        };

        tracing::info!(
            "{}: {} missing, {} extra",
            level.description(),
            entry.missing.len(),
            entry.extra.len()
        );

        report.total_missing += entry.missing.len();
        report.total_extra += entry.extra.len();
        report.levels.push(entry);
    }

    report
}
