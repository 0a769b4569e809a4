//! Presentation helpers for similarity reports.
//!
//! Ranking itself never aggregates across features; these helpers let a
//! caller pick a display order without touching the report.

use clap::ValueEnum;
use std::fmt;

use crate::models::{ItemReport, SimilarityReport};

/// How to order dataset items for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Aggregation {
    /// Keep the order the dataset was supplied in
    #[default]
    None,
    /// Sum of the four feature distances
    Sum,
    /// Smallest feature distance
    Min,
}

impl Aggregation {
    pub fn score(&self, item: &ItemReport) -> Option<f64> {
        match self {
            Aggregation::None => None,
            Aggregation::Sum => Some(item.distances.iter().map(|d| d.distance).sum()),
            Aggregation::Min => item
                .distances
                .iter()
                .map(|d| d.distance)
                .min_by(|a, b| a.total_cmp(b)),
        }
    }
}

/// Items ordered best match first under the given policy (stable for ties)
pub fn order_items(report: &SimilarityReport, aggregation: Aggregation) -> Vec<&ItemReport> {
    let mut items: Vec<&ItemReport> = report.iter().collect();
    if aggregation != Aggregation::None {
        items.sort_by(|a, b| {
            let sa = aggregation.score(a).unwrap_or(f64::INFINITY);
            let sb = aggregation.score(b).unwrap_or(f64::INFINITY);
            sa.total_cmp(&sb)
        });
    }
    items
}

/// Plain-text listing, one block per item
pub struct TextReport<'a> {
    report: &'a SimilarityReport,
    aggregation: Aggregation,
}

impl<'a> TextReport<'a> {
    pub fn new(report: &'a SimilarityReport, aggregation: Aggregation) -> Self {
        Self {
            report,
            aggregation,
        }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in order_items(self.report, self.aggregation) {
            writeln!(f, "Results for {}:", item.id)?;
            for entry in &item.distances {
                writeln!(f, "{}: {:.2}", entry.feature, entry.distance)?;
            }
            if let Some(score) = self.aggregation.score(item) {
                writeln!(f, "Score ({:?}): {:.2}", self.aggregation, score)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn render_text(report: &SimilarityReport, aggregation: Aggregation) -> String {
    TextReport::new(report, aggregation).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureDistance, FeatureName};

    fn item(id: &str, values: [f64; 4]) -> ItemReport {
        ItemReport {
            id: id.to_string(),
            distances: FeatureName::ALL
                .iter()
                .zip(values)
                .map(|(feature, distance)| FeatureDistance {
                    feature: *feature,
                    distance,
                })
                .collect(),
        }
    }

    fn sample() -> SimilarityReport {
        SimilarityReport {
            items: vec![
                item("a.png", [5.0, 5.0, 5.0, 5.0]),
                item("b.png", [1.0, 2.0, 3.0, 4.0]),
                item("c.png", [0.5, 9.0, 9.0, 9.0]),
            ],
        }
    }

    #[test]
    fn no_aggregation_keeps_catalog_order() {
        let report = sample();
        let ids: Vec<&str> = order_items(&report, Aggregation::None)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn sum_and_min_orderings() {
        let report = sample();
        let by_sum: Vec<&str> = order_items(&report, Aggregation::Sum)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(by_sum, vec!["b.png", "a.png", "c.png"]);

        let by_min: Vec<&str> = order_items(&report, Aggregation::Min)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(by_min, vec!["c.png", "b.png", "a.png"]);
    }

    #[test]
    fn text_lists_features_with_two_decimals() {
        let report = SimilarityReport {
            items: vec![item("q.png", [0.0, 1.234, 2.0, 3.0])],
        };
        let text = render_text(&report, Aggregation::None);
        assert_eq!(
            text,
            "Results for q.png:\nClosing: 0.00\nDilation: 1.23\nErosion: 2.00\nOpening: 3.00\n\n"
        );
    }

    #[test]
    fn text_with_aggregation_adds_score_line() {
        let report = SimilarityReport {
            items: vec![item("b.png", [1.0, 2.0, 3.0, 4.0]), item("a.png", [0.5, 0.5, 0.5, 0.5])],
        };
        let text = TextReport::new(&report, Aggregation::Sum).to_string();
        assert_eq!(
            text,
            "Results for a.png:\nClosing: 0.50\nDilation: 0.50\nErosion: 0.50\nOpening: 0.50\nScore (Sum): 2.00\n\n\
             Results for b.png:\nClosing: 1.00\nDilation: 2.00\nErosion: 3.00\nOpening: 4.00\nScore (Sum): 10.00\n\n"
        );
        assert_eq!(render_text(&report, Aggregation::Sum), text);
    }
}
