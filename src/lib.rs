//! Supervoxel Clustering (svclust) Library
//!
//! Hierarchical agglomerative clustering of pre-segmented point-cloud regions
//! by greedy graph contraction, plus evaluation of the resulting partition
//! against a ground-truth labeling.
//!
//! # Module Overview
//!
//! - [`metrics`] - Color and geometric dissimilarity between regions
//! - [`normalization`] - Merging criteria (manual/adaptive lambda, equalization)
//! - [`graph`] - Weighted region adjacency graph and edge contraction
//! - [`engine`] - Threshold-driven clustering loop
//! - [`evaluation`] - Best-match evaluation (precision, recall, VOI, WOV)
//! - [`sweep`] - Threshold sweep and best operating point
//! - [`config`] - Configuration values and TOML file support
//! - [`scene`] - JSON scene and labeling files
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use svclust_lib::{ClusteringConfig, ClusteringEngine, Scene, evaluate, load_labeling};
//!
//! # fn example() -> svclust_lib::Result<()> {
//! let (regions, adjacency) = Scene::load(Path::new("scene.json"))?.into_parts()?;
//! let mut engine = ClusteringEngine::new(ClusteringConfig::default());
//! engine.set_initial_state(regions, adjacency)?;
//! engine.cluster(0.3)?;
//!
//! let truth = load_labeling(Path::new("truth.json"))?;
//! let record = evaluate(&engine.labeling()?, &truth)?;
//! println!("f-score {:.3}", record.fscore);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod geometry;
pub mod graph;
pub mod metrics;
pub mod normalization;
pub mod output;
pub mod scene;
pub mod sweep;
pub mod types;

pub use config::{
    ClusteringConfig, ColorDistance, Config, CriterionKind, GeometricDistance, MergingCriterion,
    SweepConfig, DEFAULT_BINS_NUM, DEFAULT_LAMBDA,
};
pub use engine::{labeling_of, ClusteringEngine, Partition};
pub use error::{ErrorCategory, ErrorPayload, Result, SvcError};
pub use evaluation::{evaluate, LabelMap, PartitionEvaluator};
pub use graph::{ClusteringGraph, Edge, RegionPair};
pub use metrics::{DescriptorDistance, RegionDistance};
pub use normalization::{compute_cdf, Cdf, NormalizationPolicy};
pub use output::{
    ClusterOutput, ClusteringSummary, ErrorOutput, EvaluateOutput, RegionSummary, SvcOutput,
    SweepOutput, SVC_OUTPUT_VERSION,
};
pub use scene::{load_labeling, save_labeling, RegionSpec, Scene};
pub use sweep::{best_threshold, sweep, SweepResults, ThresholdRecord, ThresholdSweep};
pub use types::{LabeledPoint, Labeling, PerformanceRecord, Point, Region, RegionId};
