use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvcError};

/// Lambda used when the manual criterion is selected without an explicit value.
pub const DEFAULT_LAMBDA: f32 = 0.5;
/// Bin count used when equalization is selected without an explicit value.
pub const DEFAULT_BINS_NUM: u16 = 500;

/// Color dissimilarity between region mean colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorDistance {
    /// CIEDE2000 over Lab
    #[default]
    LabCiede2000,
    /// Euclidean distance over RGB
    RgbEuclidean,
}

/// Geometric dissimilarity between region surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometricDistance {
    #[default]
    NormalsDiff,
    /// Normals difference halved on convex junctions
    ConvexNormalsDiff,
}

/// Merging criterion without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CriterionKind {
    ManualLambda,
    #[default]
    AdaptiveLambda,
    Equalization,
}

/// How color and geometric distances are combined into one merge weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergingCriterion {
    /// `lambda * color + (1 - lambda) * geometric` with a caller-supplied lambda
    ManualLambda { lambda: f32 },
    /// Same blend with lambda derived from the initial distance populations
    AdaptiveLambda,
    /// Each distance replaced by its empirical CDF value, halved and summed
    Equalization { bins_num: u16 },
}

impl MergingCriterion {
    /// The criterion with its default parameters.
    pub fn with_defaults(kind: CriterionKind) -> Self {
        match kind {
            CriterionKind::ManualLambda => MergingCriterion::ManualLambda {
                lambda: DEFAULT_LAMBDA,
            },
            CriterionKind::AdaptiveLambda => MergingCriterion::AdaptiveLambda,
            CriterionKind::Equalization => MergingCriterion::Equalization {
                bins_num: DEFAULT_BINS_NUM,
            },
        }
    }

    pub fn kind(&self) -> CriterionKind {
        match self {
            MergingCriterion::ManualLambda { .. } => CriterionKind::ManualLambda,
            MergingCriterion::AdaptiveLambda => CriterionKind::AdaptiveLambda,
            MergingCriterion::Equalization { .. } => CriterionKind::Equalization,
        }
    }

    /// Range checks on the criterion parameters.
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            MergingCriterion::ManualLambda { lambda } => {
                if !(0.0..=1.0).contains(&lambda) {
                    return Err(SvcError::config(format!(
                        "lambda {lambda} outside range [0, 1]"
                    )));
                }
            }
            MergingCriterion::AdaptiveLambda => {}
            MergingCriterion::Equalization { bins_num } => {
                if bins_num == 0 {
                    return Err(SvcError::config("bins_num must be greater than 0"));
                }
            }
        }
        Ok(())
    }
}

impl Default for MergingCriterion {
    fn default() -> Self {
        Self::with_defaults(CriterionKind::default())
    }
}

/// Immutable clustering configuration, validated on construction.
///
/// Every "change" produces a new value; engines holding an older value must be
/// reconfigured explicitly, which invalidates any cached normalization state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClusteringConfig {
    color_distance: ColorDistance,
    geometric_distance: GeometricDistance,
    merging: MergingCriterion,
}

impl ClusteringConfig {
    pub fn new(
        color_distance: ColorDistance,
        geometric_distance: GeometricDistance,
        merging: MergingCriterion,
    ) -> Result<Self> {
        merging.validate()?;
        Ok(Self {
            color_distance,
            geometric_distance,
            merging,
        })
    }

    pub fn color_distance(&self) -> ColorDistance {
        self.color_distance
    }

    pub fn geometric_distance(&self) -> GeometricDistance {
        self.geometric_distance
    }

    pub fn merging(&self) -> MergingCriterion {
        self.merging
    }

    pub fn lambda(&self) -> Option<f32> {
        match self.merging {
            MergingCriterion::ManualLambda { lambda } => Some(lambda),
            _ => None,
        }
    }

    pub fn bins_num(&self) -> Option<u16> {
        match self.merging {
            MergingCriterion::Equalization { bins_num } => Some(bins_num),
            _ => None,
        }
    }

    pub fn with_color_distance(&self, color_distance: ColorDistance) -> Self {
        Self {
            color_distance,
            ..*self
        }
    }

    pub fn with_geometric_distance(&self, geometric_distance: GeometricDistance) -> Self {
        Self {
            geometric_distance,
            ..*self
        }
    }

    /// Switch criterion, resetting lambda and bins_num to their defaults.
    pub fn with_merging(&self, kind: CriterionKind) -> Self {
        Self {
            merging: MergingCriterion::with_defaults(kind),
            ..*self
        }
    }

    pub fn with_lambda(&self, lambda: f32) -> Result<Self> {
        if self.merging.kind() != CriterionKind::ManualLambda {
            return Err(SvcError::config(
                "lambda can be set only if the merging criterion is manual-lambda",
            ));
        }
        Self::new(
            self.color_distance,
            self.geometric_distance,
            MergingCriterion::ManualLambda { lambda },
        )
    }

    pub fn with_bins_num(&self, bins_num: u16) -> Result<Self> {
        if self.merging.kind() != CriterionKind::Equalization {
            return Err(SvcError::config(
                "bins_num can be set only if the merging criterion is equalization",
            ));
        }
        Self::new(
            self.color_distance,
            self.geometric_distance,
            MergingCriterion::Equalization { bins_num },
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.merging.validate()
    }
}

impl fmt::Display for ClusteringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "color={}, geometric={}, criterion={}",
            self.color_distance,
            self.geometric_distance,
            self.merging.kind()
        )?;
        match self.merging {
            MergingCriterion::ManualLambda { lambda } => write!(f, " (lambda {lambda:.2})"),
            MergingCriterion::AdaptiveLambda => Ok(()),
            MergingCriterion::Equalization { bins_num } => write!(f, " (bins {bins_num})"),
        }
    }
}

/// Threshold range explored by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub start: f32,
    pub end: f32,
    pub step: f32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            step: 0.05,
        }
    }
}

impl SweepConfig {
    /// Range checks only; an inverted range is swapped when the sweep runs.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(self.start) || !in_unit(self.end) || !in_unit(self.step) {
            return Err(SvcError::config(format!(
                "start threshold {}, end threshold {} and step {} must lie in [0, 1]",
                self.start, self.end, self.step
            )));
        }
        if self.step <= 0.0 {
            return Err(SvcError::config("sweep step must be greater than 0"));
        }
        Ok(())
    }
}

/// Settings loadable from a TOML file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub clustering: ClusteringConfig,
    pub sweep: SweepConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    color_distance: Option<ColorDistance>,
    geometric_distance: Option<GeometricDistance>,
    merging: Option<MergingSection>,
    sweep: Option<SweepConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MergingSection {
    criterion: CriterionKind,
    lambda: Option<f32>,
    bins_num: Option<u16>,
}

impl MergingSection {
    fn into_criterion(self) -> Result<MergingCriterion> {
        let kind = self.criterion;
        if self.lambda.is_some() && kind != CriterionKind::ManualLambda {
            return Err(SvcError::config(format!(
                "lambda can be set only if the merging criterion is manual-lambda (got {kind})"
            )));
        }
        if self.bins_num.is_some() && kind != CriterionKind::Equalization {
            return Err(SvcError::config(format!(
                "bins_num can be set only if the merging criterion is equalization (got {kind})"
            )));
        }
        Ok(match kind {
            CriterionKind::ManualLambda => MergingCriterion::ManualLambda {
                lambda: self.lambda.unwrap_or(DEFAULT_LAMBDA),
            },
            CriterionKind::AdaptiveLambda => MergingCriterion::AdaptiveLambda,
            CriterionKind::Equalization => MergingCriterion::Equalization {
                bins_num: self.bins_num.unwrap_or(DEFAULT_BINS_NUM),
            },
        })
    }
}

impl Config {
    /// Load from an explicit TOML file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let merging = match file.merging {
            Some(section) => section.into_criterion()?,
            None => MergingCriterion::default(),
        };
        let clustering = ClusteringConfig::new(
            file.color_distance.unwrap_or_default(),
            file.geometric_distance.unwrap_or_default(),
            merging,
        )?;
        Ok(Self {
            clustering,
            sweep: file.sweep.unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.sweep.validate()
    }
}

macro_rules! kebab_enum_str {
    ($ty:ty, $what:literal, { $($variant:path => $name:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($variant => $name,)+
                };
                f.write_str(name)
            }
        }

        impl FromStr for $ty {
            type Err = SvcError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(SvcError::config(format!(
                        concat!("unknown ", $what, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

kebab_enum_str!(ColorDistance, "color distance", {
    ColorDistance::LabCiede2000 => "lab-ciede2000",
    ColorDistance::RgbEuclidean => "rgb-euclidean",
});

kebab_enum_str!(GeometricDistance, "geometric distance", {
    GeometricDistance::NormalsDiff => "normals-diff",
    GeometricDistance::ConvexNormalsDiff => "convex-normals-diff",
});

kebab_enum_str!(CriterionKind, "merging criterion", {
    CriterionKind::ManualLambda => "manual-lambda",
    CriterionKind::AdaptiveLambda => "adaptive-lambda",
    CriterionKind::Equalization => "equalization",
});
