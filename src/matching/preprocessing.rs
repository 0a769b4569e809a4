use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgb};
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_colors;
use imageproc::stats::cumulative_histogram;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MatchError, Result};
use crate::matching::steps::{BlurStep, EqualizeStep, GrayscaleStep, ResizeStep};
use crate::models::{CANONICAL_SIZE, ImageSource, PreprocessedImage};
use crate::pipeline::{DebugConfig, Pipeline, PipelineData};

/// Side length of the Gaussian smoothing kernel
pub const BLUR_KERNEL_SIZE: usize = 5;

/// Decode a raw image from its source
pub fn load_image(source: &ImageSource) -> Result<DynamicImage> {
    let source_id = source.id();
    let decode_error = |reason: String| MatchError::Decode {
        source_id: source_id.clone(),
        reason,
    };

    let img = match source {
        ImageSource::Path(path) => {
            let reader = ImageReader::open(path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => MatchError::NotFound {
                    source_id: source_id.clone(),
                },
                _ => decode_error(e.to_string()),
            })?;
            reader
                .with_guessed_format()
                .map_err(|e| decode_error(e.to_string()))?
                .decode()
                .map_err(|e| decode_error(e.to_string()))?
        }
        ImageSource::Bytes { data, .. } => {
            image::load_from_memory(data).map_err(|e| decode_error(e.to_string()))?
        }
    };

    if img.width() == 0 || img.height() == 0 {
        return Err(decode_error("image is empty".to_string()));
    }

    debug!("Loaded {}: {}x{}", source_id, img.width(), img.height());
    Ok(img)
}

/// Resize to the canonical square, ignoring aspect ratio
pub fn resize(img: &DynamicImage) -> DynamicImage {
    img.resize_exact(CANONICAL_SIZE, CANONICAL_SIZE, FilterType::Triangle)
}

/// Convert image to grayscale with BT.601 weights (0.299, 0.587, 0.114).
///
/// Fixed-point with 14 fractional bits, rounded; alpha is dropped.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    map_colors(&img.to_rgb8(), |Rgb([r, g, b])| {
        let luma = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
        Luma([luma as u8])
    })
}

/// Normalized 1-D Gaussian weights for an odd kernel size.
///
/// Sigma follows the usual default for a size-only request:
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / total) as f32).collect()
}

/// Apply the fixed 5x5 Gaussian blur (separable, replicated borders)
pub fn apply_blur(img: &GrayImage) -> GrayImage {
    let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
    separable_filter_equal(img, kernel.as_slice())
}

/// Global histogram equalization.
///
/// Levels are stretched from the darkest occupied level (mapped to 0) to the
/// brightest (mapped to 255): `round((cdf[v] - cdf_min) * 255 / (total - cdf_min))`.
/// A single-level image is returned unchanged.
pub fn equalize(img: &GrayImage) -> GrayImage {
    let cdf = cumulative_histogram(img).channels[0];
    let total = cdf[255];
    let Some(cdf_min) = cdf.iter().copied().find(|&count| count > 0) else {
        return img.clone();
    };
    if cdf_min == total {
        return img.clone();
    }

    let scale = 255.0 / (total - cdf_min) as f32;
    let mut lut = [0u8; 256];
    for (level, count) in cdf.iter().enumerate() {
        lut[level] = ((count.saturating_sub(cdf_min)) as f32 * scale)
            .round()
            .min(255.0) as u8;
    }

    map_colors(img, |Luma([v])| Luma([lut[v as usize]]))
}

/// The fixed preprocessing chain: resize, grayscale, blur, equalize
pub fn build_standard_pipeline(debug: Option<DebugConfig>) -> Pipeline {
    Pipeline::new()
        .with_debug_config(debug)
        .add_step(Arc::new(ResizeStep))
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BlurStep))
        .add_step(Arc::new(EqualizeStep))
}

/// Run an already decoded image through the preprocessing chain
pub fn preprocess_image(
    pipeline: &Pipeline,
    label: &str,
    img: DynamicImage,
) -> Result<PreprocessedImage> {
    let output = pipeline.run(PipelineData::new(label, img))?;
    PreprocessedImage::new(output.image.into_luma8())
}

/// Load a source and convert it to its canonical preprocessed form
pub fn preprocess(source: &ImageSource) -> Result<PreprocessedImage> {
    let img = load_image(source)?;
    preprocess_image(&build_standard_pipeline(None), "image", img)
}
