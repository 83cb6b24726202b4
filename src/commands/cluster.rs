use std::path::PathBuf;
use std::process::ExitCode;

use svclust_lib::output::SVC_OUTPUT_VERSION;
use svclust_lib::{save_labeling, ClusterOutput, RegionSummary, SvcError, SvcOutput};

use super::{clustering_summary, engine_for_scene};
use crate::cli::{ClusteringArgs, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, log_effective_config, resolve_clustering};

/// Run the cluster command.
#[allow(clippy::too_many_arguments)]
pub fn run_cluster(
    config_path: Option<PathBuf>,
    verbose: bool,
    scene: PathBuf,
    threshold: f32,
    clustering: ClusteringArgs,
    labels_out: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let body = match cluster_scene(
        config_path,
        verbose,
        scene,
        threshold,
        &clustering,
        labels_out,
    ) {
        Ok(body) => body,
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(err, format, output);
    }
    ExitCode::SUCCESS
}

fn cluster_scene(
    config_path: Option<PathBuf>,
    verbose: bool,
    scene: PathBuf,
    threshold: f32,
    clustering: &ClusteringArgs,
    labels_out: Option<PathBuf>,
) -> Result<SvcOutput, SvcError> {
    let config = load_config(config_path.as_deref())?;
    let clustering = resolve_clustering(config.clustering, clustering)?;
    if verbose {
        log_effective_config(config_path.as_deref(), &clustering, None);
    }

    let (mut engine, initial_regions) = engine_for_scene(&scene, clustering)?;
    let merges = engine.cluster(threshold)?;

    let partition = engine.current_partition()?;
    let regions = partition
        .regions
        .iter()
        .enumerate()
        .map(|(label, (id, region))| RegionSummary {
            id: *id,
            label: label as u32,
            points: region.len(),
            mean_color: region.mean_color,
            centroid: region.centroid,
            normal: region.normal,
            curvature: region.curvature,
        })
        .collect();
    let adjacency = partition.adjacency();

    if let Some(path) = &labels_out {
        save_labeling(path, &partition.labeling())?;
    }

    Ok(SvcOutput::Cluster(ClusterOutput {
        version: SVC_OUTPUT_VERSION.to_string(),
        scene,
        threshold,
        clustering: clustering_summary(engine.config(), engine.policy()),
        initial_regions,
        merges,
        regions,
        adjacency,
        labels_path: labels_out,
    }))
}
