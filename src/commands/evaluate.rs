use std::path::PathBuf;
use std::process::ExitCode;

use svclust_lib::output::SVC_OUTPUT_VERSION;
use svclust_lib::{load_labeling, EvaluateOutput, PartitionEvaluator, SvcError, SvcOutput};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};

/// Run the evaluate command.
pub fn run_evaluate(
    verbose: bool,
    segm: PathBuf,
    truth: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let body = match evaluate_files(verbose, segm, truth) {
        Ok(body) => body,
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(err, format, output);
    }
    ExitCode::SUCCESS
}

fn evaluate_files(verbose: bool, segm: PathBuf, truth: PathBuf) -> Result<SvcOutput, SvcError> {
    let segm_labeling = load_labeling(&segm)?;
    let truth_labeling = load_labeling(&truth)?;
    if verbose {
        eprintln!(
            "Evaluating {} predicted points against {} ground-truth points",
            segm_labeling.len(),
            truth_labeling.len()
        );
    }

    let evaluator = PartitionEvaluator::with_labelings(&segm_labeling, &truth_labeling)?;
    let performance = evaluator.performance()?;

    Ok(SvcOutput::Evaluate(EvaluateOutput {
        version: SVC_OUTPUT_VERSION.to_string(),
        segm,
        truth,
        points: truth_labeling.len(),
        segm_clusters: evaluator.segm_clusters().unwrap_or_default(),
        truth_clusters: evaluator.truth_clusters().unwrap_or_default(),
        performance,
    }))
}
