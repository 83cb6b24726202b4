use std::path::Path;

use svclust_lib::{ClusteringConfig, Config, CriterionKind, SvcError, SweepConfig};

use crate::cli::ClusteringArgs;

/// Load config from a TOML file, or return defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, SvcError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string());
        SvcError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        SvcError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Merge clustering flags over the config file values.
///
/// A `--criterion` equal to the configured one keeps the configured
/// lambda/bins; a different one starts from that criterion's defaults.
pub fn resolve_clustering(
    base: ClusteringConfig,
    args: &ClusteringArgs,
) -> Result<ClusteringConfig, SvcError> {
    let mut cfg = base;
    if let Some(color) = args.color_distance {
        cfg = cfg.with_color_distance(color.into());
    }
    if let Some(geometric) = args.geometric_distance {
        cfg = cfg.with_geometric_distance(geometric.into());
    }
    if let Some(criterion) = args.criterion {
        let kind: CriterionKind = criterion.into();
        if cfg.merging().kind() != kind {
            cfg = cfg.with_merging(kind);
        }
    }
    if let Some(lambda) = args.lambda {
        cfg = cfg.with_lambda(lambda)?;
    }
    if let Some(bins_num) = args.bins_num {
        cfg = cfg.with_bins_num(bins_num)?;
    }
    Ok(cfg)
}

/// Merge sweep range flags over the config file values.
pub fn resolve_sweep(
    base: SweepConfig,
    start: Option<f32>,
    end: Option<f32>,
    step: Option<f32>,
) -> SweepConfig {
    SweepConfig {
        start: start.unwrap_or(base.start),
        end: end.unwrap_or(base.end),
        step: step.unwrap_or(base.step),
    }
}

/// Log effective config to stderr (verbose mode).
pub fn log_effective_config(
    config_path: Option<&Path>,
    clustering: &ClusteringConfig,
    sweep: Option<&SweepConfig>,
) {
    eprintln!("{}", format_effective_config(clustering, sweep, config_path));
}

/// Format effective config as a single-line string.
pub fn format_effective_config(
    clustering: &ClusteringConfig,
    sweep: Option<&SweepConfig>,
    config_source: Option<&Path>,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let mut line = format!("Effective config [{source}]: {clustering}");
    if let Some(sweep) = sweep {
        line.push_str(&format!(
            ", sweep: start={:.2}, end={:.2}, step={:.2}",
            sweep.start, sweep.end, sweep.step
        ));
    }
    line
}
