//! Rater behaviour statistics.
//!
//! Measures how each rater scores relative to everyone else: their mean and
//! spread, how often they pick the ends of the scale, and a reliability
//! figure derived from their mean absolute deviation from consensus.

use std::collections::{BTreeMap, HashMap};

use crate::model::{CriterionId, Evaluation, RaterStats, UserId, RATING_MAX, RATING_MIN};

/// Reliability never drops below this floor.
pub const RELIABILITY_FLOOR: f64 = 0.5;

/// Mean absolute deviations are divided by this before mapping to reliability.
const DEVIATION_SCALE: f64 = 3.0;

/// Raters whose extreme rate exceeds this are down-weighted.
pub const EXTREME_RATE_LIMIT: f64 = 0.25;

/// Weight factor for raters over [`EXTREME_RATE_LIMIT`].
pub const EXTREME_PENALTY: f64 = 0.7;

/// Compute statistics for every rater appearing in `evaluations`.
///
/// Consensus for a (subject, criterion) pair is the plain mean of all its
/// scores, the rater's own included. Results are ordered by user id.
pub fn compute_rater_stats(evaluations: &[Evaluation]) -> Vec<RaterStats> {
    let mut sums: HashMap<(UserId, CriterionId), (f64, usize)> = HashMap::new();
    for e in evaluations {
        let entry = sums.entry((e.subject_id, e.criterion_id)).or_default();
        entry.0 += e.score.get() as f64;
        entry.1 += 1;
    }
    let consensus: HashMap<_, f64> = sums
        .into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect();

    let mut by_rater: BTreeMap<UserId, Vec<&Evaluation>> = BTreeMap::new();
    for e in evaluations {
        by_rater.entry(e.rater_id).or_default().push(e);
    }

    by_rater
        .into_iter()
        .map(|(user_id, given)| {
            let scores: Vec<f64> = given.iter().map(|e| e.score.get() as f64).collect();
            let n = scores.len() as f64;
            let mean = scores.iter().sum::<f64>() / n;
            let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

            let extreme = given
                .iter()
                .filter(|e| {
                    let s = e.score.get();
                    s <= RATING_MIN || s >= RATING_MAX
                })
                .count() as f64;

            let mad = given
                .iter()
                .map(|e| {
                    let c = consensus[&(e.subject_id, e.criterion_id)];
                    (e.score.get() as f64 - c).abs()
                })
                .sum::<f64>()
                / n;

            RaterStats {
                user_id,
                ratings_count: given.len(),
                mean_score: mean,
                std_score: variance.sqrt(),
                extreme_rate: extreme / n,
                reliability: reliability(mad),
            }
        })
        .collect()
}

/// Map a mean absolute deviation onto `RELIABILITY_FLOOR..=1.0`.
pub fn reliability(mean_abs_deviation: f64) -> f64 {
    (1.0 / (1.0 + mean_abs_deviation / DEVIATION_SCALE)).clamp(RELIABILITY_FLOOR, 1.0)
}

/// Aggregation weight of a rater: their reliability, cut by
/// [`EXTREME_PENALTY`] when they pick the ends of the scale too often.
pub fn rater_weight(stats: &RaterStats) -> f64 {
    let extreme = if stats.extreme_rate > EXTREME_RATE_LIMIT {
        EXTREME_PENALTY
    } else {
        1.0
    };
    stats.reliability * extreme
}

/// [`rater_weight`] for every rater in `stats`.
pub fn rater_weights(stats: &[RaterStats]) -> HashMap<UserId, f64> {
    stats.iter().map(|s| (s.user_id, rater_weight(s))).collect()
}
