//! Comparison of a predicted labeling against a ground-truth labeling.
//!
//! Both labelings are grouped into label maps, intersected cluster by cluster,
//! and matched one-to-one (largest truth clusters claim first). Every metric
//! is derived from the intersection table and memoized until either side is
//! replaced.

mod label_map;
mod matching;

pub use label_map::LabelMap;

use std::cell::OnceCell;

use tracing::warn;

use crate::error::{Result, SvcError};
use crate::types::{Labeling, PerformanceRecord};
use label_map::union_size;
use matching::{best_matches, intersection_matrix};

#[derive(Debug, Clone, Copy)]
struct Rates {
    precision: f64,
    recall: f64,
    fpr: f64,
    fnr: f64,
}

#[derive(Debug)]
struct Comparison {
    intersections: Vec<Vec<usize>>,
    matches: Vec<Option<usize>>,
    rates: OnceCell<Rates>,
    fscore: OnceCell<f64>,
    voi: OnceCell<f64>,
    wov: OnceCell<f64>,
}

/// Evaluator reused across many predicted labelings of one scene.
#[derive(Debug, Default)]
pub struct PartitionEvaluator {
    segm: Option<LabelMap>,
    truth: Option<LabelMap>,
    comparison: Option<Comparison>,
}

impl PartitionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labelings(segm: &Labeling, truth: &Labeling) -> Result<Self> {
        let mut evaluator = Self::new();
        evaluator.set_truth(truth)?;
        evaluator.set_segm(segm)?;
        Ok(evaluator)
    }

    /// Replace the predicted labeling, invalidating every cached metric.
    pub fn set_segm(&mut self, segm: &Labeling) -> Result<()> {
        if segm.is_empty() {
            return Err(SvcError::config(
                "the labeling to be set as segmentation cannot be empty",
            ));
        }
        self.segm = Some(LabelMap::from_labeling(segm));
        self.refresh()
    }

    /// Replace the ground truth, invalidating every cached metric.
    pub fn set_truth(&mut self, truth: &Labeling) -> Result<()> {
        if truth.is_empty() {
            return Err(SvcError::config(
                "the labeling to be set as ground truth cannot be empty",
            ));
        }
        self.truth = Some(LabelMap::from_labeling(truth));
        self.refresh()
    }

    pub fn is_ready(&self) -> bool {
        self.comparison.is_some()
    }

    pub fn segm_clusters(&self) -> Option<usize> {
        self.segm.as_ref().map(LabelMap::len)
    }

    pub fn truth_clusters(&self) -> Option<usize> {
        self.truth.as_ref().map(LabelMap::len)
    }

    /// Shared point counts, indexed `[segm cluster][truth cluster]`.
    pub fn intersections(&self) -> Result<&[Vec<usize>]> {
        Ok(self.parts()?.2.intersections.as_slice())
    }

    /// Predicted cluster matched to each truth cluster.
    pub fn matches(&self) -> Result<&[Option<usize>]> {
        Ok(self.parts()?.2.matches.as_slice())
    }

    pub fn precision(&self) -> Result<f32> {
        Ok(self.rates()?.precision as f32)
    }

    pub fn recall(&self) -> Result<f32> {
        Ok(self.rates()?.recall as f32)
    }

    pub fn fpr(&self) -> Result<f32> {
        Ok(self.rates()?.fpr as f32)
    }

    pub fn fnr(&self) -> Result<f32> {
        Ok(self.rates()?.fnr as f32)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0.
    pub fn fscore(&self) -> Result<f32> {
        let Rates {
            precision, recall, ..
        } = self.rates()?;
        let (_, _, comparison) = self.parts()?;
        let fscore = *comparison.fscore.get_or_init(|| {
            if precision == 0.0 && recall == 0.0 {
                warn!("precision and recall are both 0; f-score set to 0");
                return 0.0;
            }
            2.0 * precision * recall / (precision + recall)
        });
        Ok(fscore as f32)
    }

    /// Variation of information, natural log.
    pub fn voi(&self) -> Result<f32> {
        let (segm, truth, comparison) = self.parts()?;
        let voi = *comparison.voi.get_or_init(|| {
            variation_of_information(segm, truth, &comparison.intersections)
        });
        Ok(voi as f32)
    }

    /// Size-weighted overlap of matched cluster pairs.
    pub fn wov(&self) -> Result<f32> {
        let (segm, truth, comparison) = self.parts()?;
        let wov = *comparison.wov.get_or_init(|| {
            let n = truth.total() as f64;
            let sum: f64 = matched_pairs(&comparison.matches)
                .map(|(i, j)| {
                    let shared = comparison.intersections[i][j] as f64;
                    let union = union_size(segm.cluster(i), truth.cluster(j)) as f64;
                    let g = truth.size(j) as f64;
                    shared * g / union
                })
                .sum();
            sum / n
        });
        Ok(wov as f32)
    }

    pub fn performance(&self) -> Result<PerformanceRecord> {
        let rates = self.rates()?;
        Ok(PerformanceRecord {
            precision: rates.precision as f32,
            recall: rates.recall as f32,
            fscore: self.fscore()?,
            voi: self.voi()?,
            wov: self.wov()?,
            fpr: rates.fpr as f32,
            fnr: rates.fnr as f32,
        })
    }

    fn refresh(&mut self) -> Result<()> {
        self.comparison = None;
        let (Some(segm), Some(truth)) = (&self.segm, &self.truth) else {
            return Ok(());
        };
        if segm.total() != truth.total() {
            return Err(SvcError::PopulationMismatch {
                segm: segm.total(),
                truth: truth.total(),
            });
        }

        let intersections = intersection_matrix(segm, truth);
        let matches = best_matches(&intersections, truth);
        self.comparison = Some(Comparison {
            intersections,
            matches,
            rates: OnceCell::new(),
            fscore: OnceCell::new(),
            voi: OnceCell::new(),
            wov: OnceCell::new(),
        });
        Ok(())
    }

    fn parts(&self) -> Result<(&LabelMap, &LabelMap, &Comparison)> {
        match (&self.segm, &self.truth, &self.comparison) {
            (Some(segm), Some(truth), Some(comparison)) => Ok((segm, truth, comparison)),
            _ => Err(SvcError::state(
                "both a segmentation and a ground truth over the same points must be set",
            )),
        }
    }

    fn rates(&self) -> Result<Rates> {
        let (segm, truth, comparison) = self.parts()?;
        Ok(*comparison.rates.get_or_init(|| {
            let (mut p, mut r, mut fp, mut fn_) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
            for (j, matched) in comparison.matches.iter().enumerate() {
                let g = truth.size(j) as f64;
                match *matched {
                    Some(i) => {
                        let shared = comparison.intersections[i][j] as f64;
                        let s = segm.size(i) as f64;
                        p += shared * g / s;
                        r += shared;
                        fp += s - shared;
                        fn_ += g - shared;
                    }
                    None => fn_ += g,
                }
            }
            let n = truth.total() as f64;
            Rates {
                precision: p / n,
                recall: r / n,
                fpr: fp / n,
                fnr: fn_ / n,
            }
        }))
    }
}

/// Evaluate one predicted labeling against a ground truth.
pub fn evaluate(segm: &Labeling, truth: &Labeling) -> Result<PerformanceRecord> {
    PartitionEvaluator::with_labelings(segm, truth)?.performance()
}

fn matched_pairs(matches: &[Option<usize>]) -> impl Iterator<Item = (usize, usize)> + '_ {
    matches
        .iter()
        .enumerate()
        .filter_map(|(j, m)| m.map(|i| (i, j)))
}

fn entropy(sizes: impl Iterator<Item = usize>, n: f64) -> f64 {
    sizes
        .map(|s| s as f64 / n)
        .filter(|f| *f > 0.0)
        .map(|f| -f * f.ln())
        .sum()
}

fn variation_of_information(segm: &LabelMap, truth: &LabelMap, counts: &[Vec<usize>]) -> f64 {
    let n = truth.total() as f64;
    let h_s = entropy(segm.sizes(), n);
    let h_t = entropy(truth.sizes(), n);

    let mut mi = 0.0f64;
    for (i, row) in counts.iter().enumerate() {
        let p = segm.size(i) as f64;
        for (j, &shared) in row.iter().enumerate() {
            if shared == 0 {
                continue;
            }
            let r = shared as f64;
            let q = truth.size(j) as f64;
            mi += (n * r / (p * q)).ln() * r / n;
        }
    }

    // rounding can leave identical partitions a hair below zero
    (h_s + h_t - 2.0 * mi).max(0.0)
}
