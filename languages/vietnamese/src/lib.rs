pub mod audit;
pub mod entry;
pub mod generator;
pub mod translator;

use std::path::Path;

use lexi_core::LevelExtraction;

pub use entry::VietnameseEntry;
pub use generator::VietnameseGenerator;
pub use translator::{MeaningTranslator, TranslationResult, TranslationStats};

/// Key holding the headword of a generated entry
pub const HEADWORD_FIELD: &str = "vietnamese";

/// Vietnamese headwords of a generated level file, placeholders left out
pub fn extract_level(path: &Path, level: u8) -> LevelExtraction {
    lexi_core::dataset::extract_level_file(path, level, HEADWORD_FIELD)
}
