pub mod error;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod report;

pub use error::{MatchError, Result};
pub use matching::{MatchingPipeline, extract, preprocess, rank};
pub use models::{
    CANONICAL_SIZE, DatasetCatalog, FeatureDistance, FeatureName, FeatureSet, ImageSource,
    ItemReport, PreprocessedImage, SimilarityReport,
};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use report::Aggregation;
