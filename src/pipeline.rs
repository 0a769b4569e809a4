use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MatchError, Result};

/// Data that flows through the pipeline
#[derive(Clone)]
pub struct PipelineData {
    /// The image at the current stage (color until grayscale conversion)
    pub image: DynamicImage,

    /// Label for this item, used to name debug outputs (e.g. "query", "dataset_03")
    pub label: String,
}

impl PipelineData {
    pub fn new(label: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            image,
            label: label.into(),
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Prepare a debug directory.
    /// The directory must be empty or non-existent.
    pub fn prepare(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(MatchError::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("Debug directory is not empty: {}", output_dir.display()),
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    /// Save one image under `<output_dir>/<stage_dir>/<file_name>`
    pub fn save(&self, stage_dir: &str, file_name: &str, image: &DynamicImage) -> Result<()> {
        let dir = self.output_dir.join(stage_dir);
        std::fs::create_dir_all(&dir)?;
        image.save(dir.join(file_name))?;
        debug!("Debug: saved {}/{}", stage_dir, file_name);
        Ok(())
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one item into the next stage's item
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Sequential step pipeline
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Attach an already prepared debug configuration
    pub fn with_debug_config(mut self, debug: Option<DebugConfig>) -> Self {
        self.context.debug = debug;
        self
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Run every step in order on a single item
    pub fn run(&self, input: PipelineData) -> Result<PipelineData> {
        let file_name = format!("{}.png", input.label);
        if let Some(debug_config) = &self.context.debug {
            debug_config.save("00_input", &file_name, &input.image)?;
        }

        let mut data = input;
        for (step_idx, step) in self.steps.iter().enumerate() {
            debug!("Running step: {} on {}", step.name(), data.label);
            data = step.process(data, &self.context)?;

            if let Some(debug_config) = &self.context.debug {
                let step_dir_name = format!(
                    "{:02}_{}",
                    step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_")
                );
                debug_config.save(&step_dir_name, &file_name, &data.image)?;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
