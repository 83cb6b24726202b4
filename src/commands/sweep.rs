use std::path::PathBuf;
use std::process::ExitCode;

use svclust_lib::output::SVC_OUTPUT_VERSION;
use svclust_lib::{load_labeling, SvcError, SvcOutput, SweepOutput, ThresholdSweep};

use super::{clustering_summary, engine_for_scene};
use crate::cli::{ClusteringArgs, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, log_effective_config, resolve_clustering, resolve_sweep};

/// Run the sweep command.
#[allow(clippy::too_many_arguments)]
pub fn run_sweep(
    config_path: Option<PathBuf>,
    verbose: bool,
    scene: PathBuf,
    truth: PathBuf,
    start: Option<f32>,
    end: Option<f32>,
    step: Option<f32>,
    clustering: ClusteringArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let body = match sweep_scene(
        config_path,
        verbose,
        scene,
        truth,
        (start, end, step),
        &clustering,
    ) {
        Ok(body) => body,
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(err, format, output);
    }
    ExitCode::SUCCESS
}

fn sweep_scene(
    config_path: Option<PathBuf>,
    verbose: bool,
    scene: PathBuf,
    truth: PathBuf,
    (start, end, step): (Option<f32>, Option<f32>, Option<f32>),
    clustering: &ClusteringArgs,
) -> Result<SvcOutput, SvcError> {
    let config = load_config(config_path.as_deref())?;
    let clustering = resolve_clustering(config.clustering, clustering)?;
    let range = resolve_sweep(config.sweep, start, end, step);
    if verbose {
        log_effective_config(config_path.as_deref(), &clustering, Some(&range));
    }

    let sweep = ThresholdSweep::new(range)?;
    let truth_labeling = load_labeling(&truth)?;
    let (mut engine, _) = engine_for_scene(&scene, clustering)?;
    let results = sweep.run(&mut engine, &truth_labeling)?;

    let range = sweep.config();
    Ok(SvcOutput::Sweep(SweepOutput {
        version: SVC_OUTPUT_VERSION.to_string(),
        scene,
        truth,
        clustering: clustering_summary(engine.config(), engine.policy()),
        start: range.start,
        end: range.end,
        step: range.step,
        best: results.best().copied(),
        records: results.records().to_vec(),
    }))
}
