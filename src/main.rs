mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_cluster, run_evaluate, run_sweep};
use tracing::Level;

fn main() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Cluster {
            scene,
            threshold,
            clustering,
            labels_out,
            format,
            output,
        } => run_cluster(
            args.config,
            args.verbose,
            scene,
            threshold,
            clustering,
            labels_out,
            format,
            output,
        ),
        Commands::Evaluate {
            segm,
            truth,
            format,
            output,
        } => run_evaluate(args.verbose, segm, truth, format, output),
        Commands::Sweep {
            scene,
            truth,
            start,
            end,
            step,
            clustering,
            format,
            output,
        } => run_sweep(
            args.config,
            args.verbose,
            scene,
            truth,
            start,
            end,
            step,
            clustering,
            format,
            output,
        ),
    }
}

/// Logs go to stderr so stdout stays a clean JSON document.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
