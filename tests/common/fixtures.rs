#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, Rgb, RgbImage};
use morphmatch::{FeatureName, FeatureSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Horizontal color gradient
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 128 / height.max(1)) as u8,
            64u8,
        ])
    })
}

/// Vertical color gradient, brighter at the bottom
pub fn vertical_gradient_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, y| {
        let v = (y * 255 / height.max(1)) as u8;
        Rgb([v, v / 2, 255 - v])
    })
}

/// Checkerboard with square cells of `cell` pixels
pub fn checkerboard_image(width: u32, height: u32, cell: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Rgb([230u8, 230u8, 230u8])
        } else {
            Rgb([20u8, 40u8, 30u8])
        }
    })
}

/// Encode an image as PNG bytes
pub fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("Failed to encode test image");
    buffer.into_inner()
}

/// Save an image as PNG under `dir` and return its path
pub fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

/// A complete feature set where every channel is a flat image of `value`
pub fn flat_feature_set(value: u8) -> FeatureSet {
    FeatureSet::from_channels(
        FeatureName::ALL.map(|name| (name, GrayImage::from_pixel(256, 256, Luma([value])))),
    )
}

/// A complete feature set with a distinct flat value per channel
pub fn feature_set_with(values: [(FeatureName, u8); 4]) -> FeatureSet {
    FeatureSet::from_channels(
        values.map(|(name, value)| (name, GrayImage::from_pixel(256, 256, Luma([value])))),
    )
}
