use std::collections::HashMap;

use tracing::debug;

use super::label_map::{LabelMap, PointKey};

/// `counts[i][j]`: points shared by predicted cluster `i` and truth cluster `j`.
///
/// Duplicate points count with multiset semantics: a location present twice
/// in one cluster and once in the other contributes one shared point.
pub(crate) fn intersection_matrix(segm: &LabelMap, truth: &LabelMap) -> Vec<Vec<usize>> {
    #[derive(Default)]
    struct Occurrences {
        segm: Vec<(usize, usize)>,
        truth: Vec<(usize, usize)>,
    }

    fn tally(list: &mut Vec<(usize, usize)>, cluster: usize) {
        match list.last_mut() {
            Some((last, count)) if *last == cluster => *count += 1,
            _ => list.push((cluster, 1)),
        }
    }

    let mut index: HashMap<PointKey, Occurrences> = HashMap::new();
    for (i, keys) in segm.clusters() {
        for key in keys {
            tally(&mut index.entry(*key).or_default().segm, i);
        }
    }
    for (j, keys) in truth.clusters() {
        for key in keys {
            if let Some(occ) = index.get_mut(key) {
                tally(&mut occ.truth, j);
            }
        }
    }

    let mut counts = vec![vec![0usize; truth.len()]; segm.len()];
    for occ in index.values() {
        for &(i, in_segm) in &occ.segm {
            for &(j, in_truth) in &occ.truth {
                counts[i][j] += in_segm.min(in_truth);
            }
        }
    }
    counts
}

/// One-to-one partial matching of truth clusters to predicted clusters.
///
/// Truth clusters claim in descending size order (ascending index on ties).
/// Each takes the unclaimed predicted cluster it shares most points with
/// (lowest index on ties); a truth cluster sharing no point with any
/// unclaimed cluster stays unmatched.
pub(crate) fn best_matches(counts: &[Vec<usize>], truth: &LabelMap) -> Vec<Option<usize>> {
    let mut order: Vec<usize> = (0..truth.len()).collect();
    order.sort_by(|&x, &y| truth.size(y).cmp(&truth.size(x)).then(x.cmp(&y)));

    let mut claimed = vec![false; counts.len()];
    let mut matches = vec![None; truth.len()];

    for j in order {
        let mut best: Option<(usize, usize)> = None;
        for (i, row) in counts.iter().enumerate() {
            let shared = row[j];
            if claimed[i] || shared == 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| shared > top) {
                best = Some((i, shared));
            }
        }

        match best {
            Some((i, shared)) => {
                debug!(truth = j, segm = i, shared, "best match");
                claimed[i] = true;
                matches[j] = Some(i);
            }
            None => debug!(truth = j, "best match not found"),
        }
    }

    matches
}
