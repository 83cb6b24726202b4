use serde::{Deserialize, Serialize};

/// Metrics comparing a predicted partition against a ground truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub precision: f32,
    pub recall: f32,
    pub fscore: f32,
    /// Variation of information (non-negative, 0 for identical partitions)
    pub voi: f32,
    /// Weighted overlap
    pub wov: f32,
    /// False positive rate
    pub fpr: f32,
    /// False negative rate
    pub fnr: f32,
}
