pub mod audit;
pub mod entry;
pub mod generator;

use std::path::Path;

use lexi_core::LevelExtraction;

pub use entry::CantoneseEntry;
pub use generator::CantoneseGenerator;

/// Key holding the headword of a generated entry
pub const HEADWORD_FIELD: &str = "cantonese";

pub fn extract_level(path: &Path, level: u8) -> LevelExtraction {
    lexi_core::dataset::extract_level_file(path, level, HEADWORD_FIELD)
}
