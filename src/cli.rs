use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use svclust_lib::{ColorDistance, CriterionKind, GeometricDistance};

#[derive(Parser)]
#[command(name = "svclust")]
#[command(
    version,
    about = "Supervoxel clustering - merge adjacent regions and score partitions",
    long_about = "Supervoxel clustering (svclust)\n\nModes:\n- cluster: merge adjacent regions of a scene until the cheapest merge reaches a threshold.\n- evaluate: score a predicted labeling against a ground-truth labeling.\n- sweep: cluster over a range of thresholds and report the best f-score.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output (debug logs, effective config)")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with distance variants, merging criterion and sweep range; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster a scene up to a merge threshold
    Cluster {
        #[arg(long, value_name = "PATH", help = "Scene JSON (regions and adjacency)")]
        scene: PathBuf,

        #[arg(
            long,
            help = "Merge while the cheapest edge weighs strictly less than this value (0-1)"
        )]
        threshold: f32,

        #[command(flatten)]
        clustering: ClusteringArgs,

        #[arg(long, value_name = "PATH", help = "Write the resulting point labeling to this file")]
        labels_out: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Evaluate a predicted labeling against a ground truth
    Evaluate {
        #[arg(long, value_name = "PATH", help = "Predicted labeling JSON")]
        segm: PathBuf,

        #[arg(long, value_name = "PATH", help = "Ground-truth labeling JSON")]
        truth: PathBuf,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Cluster over a threshold range and report the best operating point
    Sweep {
        #[arg(long, value_name = "PATH", help = "Scene JSON (regions and adjacency)")]
        scene: PathBuf,

        #[arg(long, value_name = "PATH", help = "Ground-truth labeling JSON")]
        truth: PathBuf,

        #[arg(long, help = "First threshold (default 0.0)")]
        start: Option<f32>,

        #[arg(long, help = "Last threshold (default 1.0)")]
        end: Option<f32>,

        #[arg(long, help = "Threshold increment (default 0.05)")]
        step: Option<f32>,

        #[command(flatten)]
        clustering: ClusteringArgs,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

/// Clustering overrides shared by `cluster` and `sweep`.
#[derive(Args, Debug, Clone, Default)]
pub struct ClusteringArgs {
    #[arg(long, value_enum, help = "Color distance between region mean colors")]
    pub color_distance: Option<ColorDistanceArg>,

    #[arg(long, value_enum, help = "Geometric distance between region surfaces")]
    pub geometric_distance: Option<GeometricDistanceArg>,

    #[arg(long, value_enum, help = "How color and geometric distances are combined")]
    pub criterion: Option<CriterionArg>,

    #[arg(long, help = "Color weight in [0, 1] (manual-lambda only)")]
    pub lambda: Option<f32>,

    #[arg(long, help = "Histogram bins for CDF equalization (equalization only)")]
    pub bins_num: Option<u16>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ColorDistanceArg {
    #[value(name = "lab-ciede2000")]
    LabCiede2000,
    #[value(name = "rgb-euclidean")]
    RgbEuclidean,
}

impl From<ColorDistanceArg> for ColorDistance {
    fn from(arg: ColorDistanceArg) -> Self {
        match arg {
            ColorDistanceArg::LabCiede2000 => ColorDistance::LabCiede2000,
            ColorDistanceArg::RgbEuclidean => ColorDistance::RgbEuclidean,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GeometricDistanceArg {
    #[value(name = "normals-diff")]
    NormalsDiff,
    #[value(name = "convex-normals-diff")]
    ConvexNormalsDiff,
}

impl From<GeometricDistanceArg> for GeometricDistance {
    fn from(arg: GeometricDistanceArg) -> Self {
        match arg {
            GeometricDistanceArg::NormalsDiff => GeometricDistance::NormalsDiff,
            GeometricDistanceArg::ConvexNormalsDiff => GeometricDistance::ConvexNormalsDiff,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CriterionArg {
    #[value(name = "manual-lambda")]
    ManualLambda,
    #[value(name = "adaptive-lambda")]
    AdaptiveLambda,
    #[value(name = "equalization")]
    Equalization,
}

impl From<CriterionArg> for CriterionKind {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::ManualLambda => CriterionKind::ManualLambda,
            CriterionArg::AdaptiveLambda => CriterionKind::AdaptiveLambda,
            CriterionArg::Equalization => CriterionKind::Equalization,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
