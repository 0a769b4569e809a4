use image::GrayImage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::{MatchError, Result};

/// Side length of every preprocessed image and feature channel
pub const CANONICAL_SIZE: u32 = 256;

/// Where a raw image comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes { id: String, data: Vec<u8> },
}

impl ImageSource {
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        ImageSource::Bytes { id: id.into(), data }
    }

    /// Identifier used in error messages and as the catalog key
    pub fn id(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { id, .. } => id.clone(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(path: &std::path::Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

/// The four morphological feature channels.
///
/// Variants are declared alphabetically so the derived `Ord` doubles as the
/// tie-break order used when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FeatureName {
    Closing,
    Dilation,
    Erosion,
    Opening,
}

impl FeatureName {
    pub const ALL: [FeatureName; 4] = [
        FeatureName::Closing,
        FeatureName::Dilation,
        FeatureName::Erosion,
        FeatureName::Opening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::Closing => "Closing",
            FeatureName::Dilation => "Dilation",
            FeatureName::Erosion => "Erosion",
            FeatureName::Opening => "Opening",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grayscale, normalized, denoised 256x256 image
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedImage {
    image: GrayImage,
}

impl PreprocessedImage {
    pub fn new(image: GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != CANONICAL_SIZE || height != CANONICAL_SIZE {
            return Err(MatchError::InvalidShape {
                context: "preprocessed image".to_string(),
                reason: format!(
                    "{}x{}, expected {}x{}",
                    width, height, CANONICAL_SIZE, CANONICAL_SIZE
                ),
            });
        }
        Ok(Self { image })
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }
}

/// Feature channels keyed by name.
///
/// `extract` always fills all four; sets assembled by hand through
/// `from_channels` may be partial, and the ranker reports those.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    channels: BTreeMap<FeatureName, GrayImage>,
}

impl FeatureSet {
    pub fn from_channels(channels: impl IntoIterator<Item = (FeatureName, GrayImage)>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
        }
    }

    pub fn get(&self, name: FeatureName) -> Option<&GrayImage> {
        self.channels.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, &GrayImage)> {
        self.channels.iter().map(|(name, image)| (*name, image))
    }

    pub fn names(&self) -> Vec<FeatureName> {
        self.channels.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// True when all four channels are present at the canonical shape
    pub fn is_complete(&self) -> bool {
        FeatureName::ALL.iter().all(|name| {
            self.channels
                .get(name)
                .is_some_and(|image| image.dimensions() == (CANONICAL_SIZE, CANONICAL_SIZE))
        })
    }
}

/// Dataset items in the order they were supplied
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    items: Vec<(String, FeatureSet)>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item. An existing id keeps its position and gets the new features.
    pub fn insert(&mut self, id: impl Into<String>, features: FeatureSet) {
        let id = id.into();
        match self.items.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = features,
            None => self.items.push((id, features)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FeatureSet> {
        self.items
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, features)| features)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureSet)> {
        self.items.iter().map(|(id, features)| (id.as_str(), features))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FeatureSet)> for DatasetCatalog {
    fn from_iter<I: IntoIterator<Item = (S, FeatureSet)>>(iter: I) -> Self {
        let mut catalog = DatasetCatalog::new();
        for (id, features) in iter {
            catalog.insert(id, features);
        }
        catalog
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureDistance {
    pub feature: FeatureName,
    pub distance: f64,
}

/// Per-item distances, sorted ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub id: String,
    pub distances: Vec<FeatureDistance>,
}

impl ItemReport {
    pub fn distance(&self, feature: FeatureName) -> Option<f64> {
        self.distances
            .iter()
            .find(|entry| entry.feature == feature)
            .map(|entry| entry.distance)
    }
}

/// Result of one ranking call, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimilarityReport {
    pub items: Vec<ItemReport>,
}

impl SimilarityReport {
    pub fn get(&self, id: &str) -> Option<&ItemReport> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemReport> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names_sort_alphabetically() {
        let mut names = vec![
            FeatureName::Opening,
            FeatureName::Erosion,
            FeatureName::Closing,
            FeatureName::Dilation,
        ];
        names.sort();
        let labels: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(labels, vec!["Closing", "Dilation", "Erosion", "Opening"]);
    }

    #[test]
    fn preprocessed_image_rejects_wrong_shape() {
        let err = PreprocessedImage::new(GrayImage::new(128, 256)).unwrap_err();
        assert!(matches!(err, MatchError::InvalidShape { .. }));
        assert!(PreprocessedImage::new(GrayImage::new(256, 256)).is_ok());
    }

    #[test]
    fn catalog_reinsert_keeps_position() {
        let mut catalog = DatasetCatalog::new();
        catalog.insert("a", FeatureSet::default());
        catalog.insert("b", FeatureSet::default());
        let replacement =
            FeatureSet::from_channels([(FeatureName::Erosion, GrayImage::new(256, 256))]);
        catalog.insert("a", replacement.clone());

        let ids: Vec<&str> = catalog.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(catalog.get("a"), Some(&replacement));
    }

    #[test]
    fn partial_feature_set_is_incomplete() {
        let partial = FeatureSet::from_channels([(FeatureName::Erosion, GrayImage::new(256, 256))]);
        assert!(!partial.is_complete());

        let full = FeatureSet::from_channels(
            FeatureName::ALL.map(|name| (name, GrayImage::new(256, 256))),
        );
        assert!(full.is_complete());
    }
}
