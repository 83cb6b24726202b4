use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use svclust_lib::output::SVC_OUTPUT_VERSION;
use svclust_lib::{ErrorOutput, PerformanceRecord, SvcError, SvcOutput};

use crate::cli::OutputFormat;

/// Regions listed in the human-readable cluster report.
const MAX_LISTED_REGIONS: usize = 20;

/// Write output in the requested format.
pub fn write_output(
    body: &SvcOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), SvcError> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: SvcError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = SvcOutput::Error(ErrorOutput {
        version: SVC_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(body: &SvcOutput, output: Option<&Path>) -> Result<(), SvcError> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &SvcOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &SvcOutput, colorize: bool) -> String {
    match body {
        SvcOutput::Cluster(out) => {
            let mut buf = String::new();
            let header = color("[CLUSTER]", "36", colorize);
            writeln!(
                buf,
                "{} {} -> {} regions ({} merges, threshold {:.3})",
                header,
                out.initial_regions,
                out.regions.len(),
                out.merges,
                out.threshold
            )
            .ok();
            writeln!(buf, "Scene: {}", out.scene.display()).ok();
            write_clustering(&mut buf, &out.clustering);
            writeln!(buf, "Remaining edges: {}", out.adjacency.len()).ok();

            if !out.regions.is_empty() {
                writeln!(buf, "Regions (max {MAX_LISTED_REGIONS}):").ok();
                for region in out.regions.iter().take(MAX_LISTED_REGIONS) {
                    let [r, g, b] = region.mean_color;
                    writeln!(
                        buf,
                        "- {:>6} label {:>4}  {:>7} pts  rgb({:.0}, {:.0}, {:.0})",
                        region.id, region.label, region.points, r, g, b
                    )
                    .ok();
                }
            }
            if let Some(path) = &out.labels_path {
                writeln!(buf, "Labels: {}", path.display()).ok();
            }
            buf
        }
        SvcOutput::Evaluate(out) => {
            let mut buf = String::new();
            let header = color("[EVALUATE]", "34", colorize);
            writeln!(
                buf,
                "{} {} points, {} predicted / {} ground-truth clusters",
                header, out.points, out.segm_clusters, out.truth_clusters
            )
            .ok();
            write_performance(&mut buf, &out.performance, colorize);
            buf
        }
        SvcOutput::Sweep(out) => {
            let mut buf = String::new();
            let header = color("[SWEEP]", "35", colorize);
            writeln!(
                buf,
                "{} thresholds {:.2}..{:.2} step {:.2}",
                header, out.start, out.end, out.step
            )
            .ok();
            write_clustering(&mut buf, &out.clustering);
            writeln!(buf, "{:>9}  {:>7}  {:>7}  {:>7}", "threshold", "fscore", "voi", "wov").ok();
            for record in &out.records {
                let is_best = out
                    .best
                    .map(|b| b.threshold == record.threshold)
                    .unwrap_or(false);
                let line = format!(
                    "{:>9.3}  {:>7.3}  {:>7.3}  {:>7.3}",
                    record.threshold,
                    record.performance.fscore,
                    record.performance.voi,
                    record.performance.wov
                );
                let line = if is_best { color(&line, "32", colorize) } else { line };
                writeln!(buf, "{line}").ok();
            }
            if let Some(best) = &out.best {
                writeln!(buf, "Best threshold: {:.3}", best.threshold).ok();
                write_performance(&mut buf, &best.performance, colorize);
            }
            buf
        }
        SvcOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn write_clustering(buf: &mut String, clustering: &svclust_lib::ClusteringSummary) {
    let mut line = format!(
        "Clustering: color={}, geometric={}, criterion={}",
        clustering.color_distance, clustering.geometric_distance, clustering.criterion
    );
    if let Some(lambda) = clustering.lambda {
        line.push_str(&format!(", lambda={lambda:.3}"));
    }
    if let Some(bins) = clustering.bins_num {
        line.push_str(&format!(", bins={bins}"));
    }
    writeln!(buf, "{line}").ok();
}

fn write_performance(buf: &mut String, perf: &PerformanceRecord, colorize: bool) {
    let score = |value: f32| color(&format!("{:.3}", value), score_color_code(value), colorize);
    writeln!(buf, "Metrics:").ok();
    writeln!(buf, "- {:10} {}", "fscore", score(perf.fscore)).ok();
    writeln!(buf, "- {:10} {}", "precision", score(perf.precision)).ok();
    writeln!(buf, "- {:10} {}", "recall", score(perf.recall)).ok();
    writeln!(buf, "- {:10} {}", "wov", score(perf.wov)).ok();
    writeln!(buf, "- {:10} {:.3}", "voi", perf.voi).ok();
    writeln!(buf, "- {:10} {:.3}", "fpr", perf.fpr).ok();
    writeln!(buf, "- {:10} {:.3}", "fnr", perf.fnr).ok();
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Map score to ANSI color code.
fn score_color_code(score: f32) -> &'static str {
    if score >= 0.9 {
        "32" // green
    } else if score >= 0.75 {
        "33" // yellow
    } else {
        "31" // red
    }
}
