use image::GrayImage;
use tracing::debug;

use crate::error::{MatchError, Result};
use crate::models::{
    CANONICAL_SIZE, DatasetCatalog, FeatureDistance, FeatureName, FeatureSet, ItemReport,
    SimilarityReport,
};

/// Euclidean distance between two equally sized buffers, treated as flat vectors
pub fn euclidean_distance(a: &GrayImage, b: &GrayImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let sum: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| {
            let d = x.abs_diff(y) as u64;
            d * d
        })
        .sum();
    (sum as f64).sqrt()
}

/// The query must carry all four channels at the canonical shape
fn validate_query(query: &FeatureSet) -> Result<()> {
    for name in FeatureName::ALL {
        match query.get(name) {
            None => {
                return Err(MatchError::InvalidShape {
                    context: "query feature set".to_string(),
                    reason: format!("missing {} channel", name),
                });
            }
            Some(channel) if channel.dimensions() != (CANONICAL_SIZE, CANONICAL_SIZE) => {
                let (width, height) = channel.dimensions();
                return Err(MatchError::InvalidShape {
                    context: "query feature set".to_string(),
                    reason: format!(
                        "{} channel is {}x{}, expected {}x{}",
                        name, width, height, CANONICAL_SIZE, CANONICAL_SIZE
                    ),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// A dataset item must expose the query's channels with identical shapes
fn check_item(id: &str, query: &FeatureSet, item: &FeatureSet) -> Result<()> {
    if item.len() != query.len() {
        return Err(MatchError::FeatureMismatch {
            item: id.to_string(),
            reason: format!("has {} feature channels, expected {}", item.len(), query.len()),
        });
    }

    for (name, query_channel) in query.iter() {
        let Some(channel) = item.get(name) else {
            return Err(MatchError::FeatureMismatch {
                item: id.to_string(),
                reason: format!("missing {} channel", name),
            });
        };
        if channel.dimensions() != query_channel.dimensions() {
            let (width, height) = channel.dimensions();
            let (expected_w, expected_h) = query_channel.dimensions();
            return Err(MatchError::FeatureMismatch {
                item: id.to_string(),
                reason: format!(
                    "{} channel is {}x{}, expected {}x{}",
                    name, width, height, expected_w, expected_h
                ),
            });
        }
    }
    Ok(())
}

/// Distances for one item, sorted ascending with alphabetical tie-breaks
fn score_item(id: &str, query: &FeatureSet, item: &FeatureSet) -> Result<ItemReport> {
    check_item(id, query, item)?;

    let mut distances: Vec<FeatureDistance> = query
        .iter()
        .filter_map(|(name, query_channel)| {
            item.get(name).map(|channel| FeatureDistance {
                feature: name,
                distance: euclidean_distance(query_channel, channel),
            })
        })
        .collect();

    distances.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.feature.as_str().cmp(b.feature.as_str()))
    });

    Ok(ItemReport {
        id: id.to_string(),
        distances,
    })
}

/// Compare the query against every dataset item, feature by feature.
///
/// Items appear in catalog order. Any malformed item aborts the whole call.
pub fn rank(query: &FeatureSet, dataset: &DatasetCatalog) -> Result<SimilarityReport> {
    validate_query(query)?;

    let items = dataset
        .iter()
        .map(|(id, features)| score_item(id, query, features))
        .collect::<Result<Vec<_>>>()?;

    debug!("Ranked {} dataset items", items.len());
    Ok(SimilarityReport { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn distance_of_known_buffers() {
        let a = GrayImage::from_pixel(2, 2, Luma([10u8]));
        let b = GrayImage::from_pixel(2, 2, Luma([13u8]));
        // four pixels each off by 3: sqrt(4 * 9) = 6
        assert_eq!(euclidean_distance(&a, &b), 6.0);
        assert_eq!(euclidean_distance(&b, &a), 6.0);
    }

    #[test]
    fn distance_does_not_wrap() {
        let a = GrayImage::from_pixel(1, 1, Luma([0u8]));
        let b = GrayImage::from_pixel(1, 1, Luma([255u8]));
        assert_eq!(euclidean_distance(&a, &b), 255.0);
        assert_eq!(euclidean_distance(&b, &a), 255.0);
    }
}
