pub mod audit;
pub mod compare;
pub mod dataset;
pub mod de;
pub mod preprocess;
pub mod types;

pub use dataset::LoadError;
pub use types::{LevelExtraction, SourceWord};
