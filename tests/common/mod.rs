mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from morphmatch for tests
pub use morphmatch::{
    DatasetCatalog, FeatureName, FeatureSet, ImageSource, MatchError, PreprocessedImage,
    SimilarityReport, extract, preprocess, rank,
};
