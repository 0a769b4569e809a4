pub mod features;
pub mod preprocessing;
pub mod similarity;
pub mod steps;

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::models::{DatasetCatalog, FeatureSet, ImageSource, SimilarityReport};
use crate::pipeline::{DebugConfig, Pipeline};

pub use features::extract;
pub use preprocessing::preprocess;
pub use similarity::rank;

/// Main matching pipeline orchestrator.
///
/// Holds only configuration; every call builds its feature sets and catalog
/// fresh from the sources it is given.
pub struct MatchingPipeline {
    preprocessing: Pipeline,
    debug: Option<DebugConfig>,
    parallel: bool,
}

impl MatchingPipeline {
    pub fn new() -> Self {
        Self {
            preprocessing: preprocessing::build_standard_pipeline(None),
            debug: None,
            parallel: true,
        }
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        let debug = DebugConfig::prepare(output_dir)?;
        self.preprocessing = preprocessing::build_standard_pipeline(Some(debug.clone()));
        self.debug = Some(debug);
        Ok(self)
    }

    /// Process dataset items on the rayon pool (default) or one by one
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Preprocess and extract features for one source
    pub fn process(&self, source: &ImageSource, label: &str) -> Result<FeatureSet> {
        let img = preprocessing::load_image(source)?;
        let preprocessed = preprocessing::preprocess_image(&self.preprocessing, label, img)?;
        let features = features::extract(&preprocessed);

        if let Some(debug) = &self.debug {
            features::save_features(debug, label, &features)?;
        }

        Ok(features)
    }

    /// Build a catalog keyed by source id, in the order the sources were given
    pub fn build_catalog(&self, sources: &[ImageSource]) -> Result<DatasetCatalog> {
        let process_item =
            |(idx, source): (usize, &ImageSource)| -> Result<(String, FeatureSet)> {
                let label = format!("dataset_{:02}", idx + 1);
                Ok((source.id(), self.process(source, &label)?))
            };

        let items: Vec<(String, FeatureSet)> = if self.parallel {
            sources
                .par_iter()
                .enumerate()
                .map(process_item)
                .collect::<Result<_>>()?
        } else {
            sources
                .iter()
                .enumerate()
                .map(process_item)
                .collect::<Result<_>>()?
        };

        Ok(items.into_iter().collect())
    }

    /// Run the full pipeline: query features, dataset catalog, ranking
    pub fn run(&self, query: &ImageSource, dataset: &[ImageSource]) -> Result<SimilarityReport> {
        info!("Processing query image {}", query.id());
        let query_features = self.process(query, "query")?;

        info!("Processing {} dataset images", dataset.len());
        let catalog = self.build_catalog(dataset)?;

        let report = similarity::rank(&query_features, &catalog)?;
        info!("Computed similarity for {} items", report.len());
        Ok(report)
    }
}

impl Default for MatchingPipeline {
    fn default() -> Self {
        Self::new()
    }
}
