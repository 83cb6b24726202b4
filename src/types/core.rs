//! Point-level types shared by the clustering engine and the evaluator.

use serde::{Deserialize, Serialize};

/// Stable identifier of a region, unique within one graph.
pub type RegionId = u32;

/// A colored point of the underlying cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub position: [f32; 3],
    /// RGB, 0-255 per channel
    pub color: [u8; 3],
}

impl Point {
    pub fn new(position: [f32; 3], color: [u8; 3]) -> Self {
        Self { position, color }
    }
}

/// A point carrying a cluster (or ground-truth) label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledPoint {
    pub position: [f32; 3],
    pub label: u32,
}

impl LabeledPoint {
    pub fn new(position: [f32; 3], label: u32) -> Self {
        Self { position, label }
    }
}

/// Point-to-label assignment over a whole cloud.
///
/// Two labelings compared by the evaluator must describe the same point
/// population; points are matched by spatial coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labeling {
    pub points: Vec<LabeledPoint>,
}

impl Labeling {
    pub fn new(points: Vec<LabeledPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of distinct labels.
    pub fn label_count(&self) -> usize {
        let mut labels: Vec<u32> = self.points.iter().map(|p| p.label).collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

impl FromIterator<LabeledPoint> for Labeling {
    fn from_iter<I: IntoIterator<Item = LabeledPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_count_ignores_duplicates() {
        let labeling: Labeling = [
            LabeledPoint::new([0.0, 0.0, 0.0], 4),
            LabeledPoint::new([1.0, 0.0, 0.0], 4),
            LabeledPoint::new([2.0, 0.0, 0.0], 9),
        ]
        .into_iter()
        .collect();

        assert_eq!(labeling.len(), 3);
        assert_eq!(labeling.label_count(), 2);
        assert!(!labeling.is_empty());
    }

    #[test]
    fn labeling_serializes_as_plain_array() {
        let labeling = Labeling::new(vec![LabeledPoint::new([1.0, 2.0, 3.0], 7)]);
        let json = serde_json::to_string(&labeling).expect("serialize");
        assert_eq!(json, r#"[{"position":[1.0,2.0,3.0],"label":7}]"#);
    }
}
