mod cluster;
mod evaluate;
mod sweep;

pub use cluster::run_cluster;
pub use evaluate::run_evaluate;
pub use sweep::run_sweep;

use std::path::Path;

use svclust_lib::{
    ClusteringConfig, ClusteringEngine, ClusteringSummary, NormalizationPolicy, Scene, SvcError,
};

/// Load a scene and hand its regions to a fresh engine.
///
/// Returns the engine and the initial region count.
fn engine_for_scene(
    scene: &Path,
    config: ClusteringConfig,
) -> Result<(ClusteringEngine, usize), SvcError> {
    let (regions, adjacency) = Scene::load(scene)?.into_parts()?;
    let initial_regions = regions.len();
    let mut engine = ClusteringEngine::new(config);
    engine.set_initial_state(regions, adjacency)?;
    Ok((engine, initial_regions))
}

/// Settings echoed in reports; adaptive runs report the fitted lambda.
fn clustering_summary(
    config: &ClusteringConfig,
    policy: Option<&NormalizationPolicy>,
) -> ClusteringSummary {
    ClusteringSummary {
        color_distance: config.color_distance().to_string(),
        geometric_distance: config.geometric_distance().to_string(),
        criterion: config.merging().kind().to_string(),
        lambda: policy.and_then(NormalizationPolicy::lambda).or(config.lambda()),
        bins_num: config.bins_num(),
    }
}
