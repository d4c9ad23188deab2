pub mod assembler;
pub mod metadata;

pub use assembler::FeatureAssembler;
pub use metadata::{MetadataExtractor, METADATA_FEATURE_NAMES, METADATA_WIDTH};
