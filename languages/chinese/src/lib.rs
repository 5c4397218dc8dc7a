pub mod enrichment;
pub mod hsk;
pub mod loader;
pub mod missing;
pub mod record;

pub use enrichment::{EnrichedItem, Enricher};
pub use hsk::{HskLevel, HskLevels};
pub use loader::HskLoader;
pub use record::HskRecord;
