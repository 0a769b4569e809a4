use image::{DynamicImage, GrayImage};
use imageproc::morphology::{Mask, grayscale_close, grayscale_dilate, grayscale_erode, grayscale_open};

use crate::error::Result;
use crate::models::{FeatureName, FeatureSet, PreprocessedImage};
use crate::pipeline::DebugConfig;

/// Radius of the square structuring element (5x5)
pub const ELEMENT_RADIUS: u8 = 2;

/// The fixed 5x5 all-ones structuring element
pub fn structuring_element() -> Mask {
    Mask::square(ELEMENT_RADIUS)
}

/// Compute one feature channel. Opening and closing are computed from the
/// input directly, never from the erosion/dilation outputs.
pub fn compute_feature(image: &GrayImage, name: FeatureName, element: &Mask) -> GrayImage {
    match name {
        FeatureName::Erosion => grayscale_erode(image, element),
        FeatureName::Dilation => grayscale_dilate(image, element),
        FeatureName::Opening => grayscale_open(image, element),
        FeatureName::Closing => grayscale_close(image, element),
    }
}

/// Extract all four morphological feature channels
pub fn extract(image: &PreprocessedImage) -> FeatureSet {
    let element = structuring_element();
    let gray = image.as_gray();
    FeatureSet::from_channels(
        FeatureName::ALL.map(|name| (name, compute_feature(gray, name, &element))),
    )
}

/// Write each channel of a feature set to `05_features/<label>_<feature>.png`
pub fn save_features(debug: &DebugConfig, label: &str, features: &FeatureSet) -> Result<()> {
    for (name, channel) in features.iter() {
        let file_name = format!("{}_{}.png", label, name.as_str().to_lowercase());
        debug.save(
            "05_features",
            &file_name,
            &DynamicImage::ImageLuma8(channel.clone()),
        )?;
    }
    Ok(())
}
