use std::path::{Path, PathBuf};

use lexi_core::dataset::{extract_level_file, load_records};
use lexi_core::{LevelExtraction, LoadError, SourceWord};

use crate::hsk::HskLevel;
use crate::record::HskRecord;

/// Most parts a split level file is broken into
pub const MAX_PARTS: usize = 4;

/// Reads an HSK dataset directory of `{level}.json` files.
///
/// A level may instead ship as `{level}_part1.json` .. `{level}_part4.json`;
/// the parts are read in order and concatenated.
#[derive(Debug, Clone)]
pub struct HskLoader {
    dir: PathBuf,
}

impl HskLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn level_path(&self, level: HskLevel) -> PathBuf {
        self.dir.join(format!("{}.json", level.number()))
    }

    /// Files holding a level, the single file winning over parts
    pub fn level_files(&self, level: HskLevel) -> Vec<PathBuf> {
        let single = self.level_path(level);
        if single.exists() {
            return vec![single];
        }

        (1..=MAX_PARTS)
            .map(|part| self.dir.join(format!("{}_part{}.json", level.number(), part)))
            .filter(|path| path.exists())
            .collect()
    }

    /// Typed records of a level; entries that do not fit are skipped
    pub fn load_level(&self, level: HskLevel) -> Result<Vec<HskRecord>, LoadError> {
        let files = self.level_files(level);
        if files.is_empty() {
            return Err(LoadError::FileNotFound(
                self.level_path(level).display().to_string(),
            ));
        }

        let mut records = Vec::new();
        for path in &files {
            tracing::info!("Loading {} from {}", level.as_str(), path.display());
            for (index, raw) in load_records(path)?.into_iter().enumerate() {
                match serde_json::from_value::<HskRecord>(raw) {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!(
                        "Skipping entry {} of {}: {}",
                        index,
                        path.display(),
                        e
                    ),
                }
            }
        }

        tracing::info!("Loaded {} records for {}", records.len(), level.description());
        Ok(records)
    }

    pub fn source_words(&self, level: HskLevel) -> Result<Vec<SourceWord>, LoadError> {
        Ok(self
            .load_level(level)?
            .iter()
            .map(HskRecord::to_source_word)
            .filter(|word| !word.chinese_word.is_empty())
            .collect())
    }

    /// `simplified` headwords of a level; file problems end up in `error`
    pub fn extract_words(&self, level: HskLevel) -> LevelExtraction {
        let files = self.level_files(level);
        if files.is_empty() {
            return extract_level_file(&self.level_path(level), level.number(), "simplified");
        }

        let mut merged = LevelExtraction {
            level: level.number(),
            path: files[0].clone(),
            ..Default::default()
        };

        for path in &files {
            let part = extract_level_file(path, level.number(), "simplified");
            merged.total_entries += part.total_entries;
            merged.words.extend(part.words);
            if let Some(error) = part.error {
                merged.error = Some(error);
            }
        }

        merged
    }

    pub fn extract_all(&self) -> Vec<LevelExtraction> {
        HskLevel::ALL
            .iter()
            .map(|level| self.extract_words(*level))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexi_core::dataset::write_json;
    use serde_json::json;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lexi-hsk-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(simplified: &str, pinyin: &str) -> serde_json::Value {
        json!({
            "simplified": simplified,
            "frequency": 10,
            "forms": [{"transcriptions": {"pinyin": pinyin}, "meanings": ["m"]}]
        })
    }

    #[test]
    fn test_single_level_file() {
        let dir = scratch_dir("single");
        write_json(
            &dir.join("1.json"),
            &json!([entry("爱", "ài"), {"broken": true}, entry("八", "bā")]),
        )
        .unwrap();

        let loader = HskLoader::new(&dir);
        let words = loader.source_words(HskLevel::Hsk1).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].pinyin, "bā");

        let extraction = loader.extract_words(HskLevel::Hsk1);
        assert_eq!(extraction.words, vec!["爱", "八"]);
        assert_eq!(extraction.total_entries, 3);
    }

    #[test]
    fn test_split_level_parts_are_concatenated() {
        let dir = scratch_dir("split");
        write_json(&dir.join("7_part1.json"), &json!([entry("冰箱", "bīngxiāng")])).unwrap();
        write_json(&dir.join("7_part2.json"), &json!([entry("博物馆", "bówùguǎn")])).unwrap();

        let loader = HskLoader::new(&dir);
        assert_eq!(loader.level_files(HskLevel::Hsk7).len(), 2);

        let words = loader.source_words(HskLevel::Hsk7).unwrap();
        assert_eq!(
            words.iter().map(|w| w.chinese_word.as_str()).collect::<Vec<_>>(),
            vec!["冰箱", "博物馆"]
        );

        let extraction = loader.extract_words(HskLevel::Hsk7);
        assert!(extraction.is_ok());
        assert_eq!(extraction.words.len(), 2);
    }

    #[test]
    fn test_missing_level() {
        let dir = scratch_dir("missing");
        let loader = HskLoader::new(&dir);

        assert!(matches!(
            loader.load_level(HskLevel::Hsk3),
            Err(LoadError::FileNotFound(_))
        ));

        let all = loader.extract_all();
        assert_eq!(all.len(), 7);
        assert!(all.iter().all(|e| e.error.is_some()));
    }
}
