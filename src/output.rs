use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::sweep::ThresholdRecord;
use crate::types::{PerformanceRecord, RegionId};

/// Schema version for output payloads.
pub const SVC_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SvcOutput {
    Cluster(ClusterOutput),
    Evaluate(EvaluateOutput),
    Sweep(SweepOutput),
    Error(ErrorOutput),
}

/// Effective clustering settings echoed back in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringSummary {
    pub color_distance: String,
    pub geometric_distance: String,
    pub criterion: String,
    /// Lambda actually used by the blend (adaptive runs report the fitted value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins_num: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub id: RegionId,
    pub label: u32,
    pub points: usize,
    pub mean_color: [f32; 3],
    pub centroid: [f32; 3],
    pub normal: [f32; 3],
    pub curvature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOutput {
    pub version: String,
    pub scene: PathBuf,
    pub threshold: f32,
    pub clustering: ClusteringSummary,
    pub initial_regions: usize,
    pub merges: usize,
    pub regions: Vec<RegionSummary>,
    pub adjacency: Vec<(RegionId, RegionId)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOutput {
    pub version: String,
    pub segm: PathBuf,
    pub truth: PathBuf,
    pub points: usize,
    pub segm_clusters: usize,
    pub truth_clusters: usize,
    pub performance: PerformanceRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOutput {
    pub version: String,
    pub scene: PathBuf,
    pub truth: PathBuf,
    pub clustering: ClusteringSummary,
    pub start: f32,
    pub end: f32,
    pub step: f32,
    pub records: Vec<ThresholdRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<ThresholdRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn summary() -> ClusteringSummary {
        ClusteringSummary {
            color_distance: "lab-ciede2000".into(),
            geometric_distance: "normals-diff".into(),
            criterion: "manual-lambda".into(),
            lambda: Some(0.5),
            bins_num: None,
        }
    }

    #[test]
    fn cluster_output_serializes() {
        let output = SvcOutput::Cluster(ClusterOutput {
            version: SVC_OUTPUT_VERSION.to_string(),
            scene: PathBuf::from("scene.json"),
            threshold: 0.25,
            clustering: summary(),
            initial_regions: 3,
            merges: 1,
            regions: vec![RegionSummary {
                id: 0,
                label: 0,
                points: 8,
                mean_color: [1.0, 2.0, 3.0],
                centroid: [0.0, 0.0, 1.0],
                normal: [0.0, 0.0, -1.0],
                curvature: 0.0,
            }],
            adjacency: vec![(0, 2)],
            labels_path: None,
        });

        let json = serde_json::to_string(&output).expect("serialize cluster output");
        assert!(json.contains("\"mode\":\"cluster\""));
        assert!(json.contains("\"initialRegions\":3"));
        assert!(json.contains("\"adjacency\":[[0,2]]"));
        assert!(!json.contains("binsNum"));
        assert!(!json.contains("labelsPath"));
    }

    #[test]
    fn sweep_output_serializes() {
        let record = ThresholdRecord {
            threshold: 0.5,
            performance: PerformanceRecord {
                fscore: 0.75,
                ..Default::default()
            },
        };
        let output = SvcOutput::Sweep(SweepOutput {
            version: SVC_OUTPUT_VERSION.to_string(),
            scene: PathBuf::from("scene.json"),
            truth: PathBuf::from("truth.json"),
            clustering: summary(),
            start: 0.0,
            end: 1.0,
            step: 0.5,
            records: vec![record],
            best: Some(record),
        });

        let json = serde_json::to_string(&output).expect("serialize sweep output");
        assert!(json.contains("\"mode\":\"sweep\""));
        assert!(json.contains("\"fscore\":0.75"));
        assert!(json.contains("\"best\":{\"threshold\":0.5"));
    }

    #[test]
    fn error_output_serializes() {
        let output = SvcOutput::Error(ErrorOutput {
            version: SVC_OUTPUT_VERSION.to_string(),
            message: Some("bad".into()),
            error: ErrorPayload::new(ErrorCategory::Config, "bad".into(), "fix it"),
        });
        let json = serde_json::to_string(&output).expect("serialize error output");
        assert!(json.contains("\"mode\":\"error\""));
        assert!(json.contains("\"category\":\"config\""));
    }
}
