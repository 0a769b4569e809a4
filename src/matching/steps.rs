use image::DynamicImage;

use crate::error::Result;
use crate::matching::preprocessing;
use crate::pipeline::{PipelineContext, PipelineData, PipelineStep};

/// Resize to 256x256
pub struct ResizeStep;

impl PipelineStep for ResizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        Ok(PipelineData {
            image: preprocessing::resize(&data.image),
            label: data.label,
        })
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        Ok(PipelineData {
            image: DynamicImage::ImageLuma8(gray),
            label: data.label,
        })
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Apply the 5x5 Gaussian blur
pub struct BlurStep;

impl PipelineStep for BlurStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let blurred = preprocessing::apply_blur(&gray);
        Ok(PipelineData {
            image: DynamicImage::ImageLuma8(blurred),
            label: data.label,
        })
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Global histogram equalization
pub struct EqualizeStep;

impl PipelineStep for EqualizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let equalized = preprocessing::equalize(&gray);
        Ok(PipelineData {
            image: DynamicImage::ImageLuma8(equalized),
            label: data.label,
        })
    }

    fn name(&self) -> &str {
        "Histogram Equalization"
    }
}
