//! Evaluation summary aggregation.
//!
//! Per subject and criterion, the mean score across all raters, either
//! plain or weighted by each rater's familiarity with the subject and
//! optionally by per-rater weights, plus the reciprocity gate that hides a user's own summary until they have
//! rated enough others.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{
    Criterion, CriterionId, Evaluation, EvaluationSummary, EvaluationSummaryItem, GatingState,
    UserId,
};

/// How rater contributions are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Every rater counts once.
    Uniform,
    /// Each rater counts with their familiarity with the subject
    /// (1 when none was recorded).
    Familiarity,
}

/// Number of distinct (subject, criterion) pairs `user` has rated.
pub fn outbound_count(user: UserId, given: &[Evaluation]) -> usize {
    given
        .iter()
        .filter(|e| e.rater_id == user)
        .map(|e| (e.subject_id, e.criterion_id))
        .collect::<HashSet<_>>()
        .len()
}

/// Weighted arithmetic mean of `(value, weight)` pairs.
///
/// Returns `None` for an empty input or a zero total weight.
pub fn weighted_mean(samples: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (sum, weights) = samples
        .into_iter()
        .fold((0.0, 0.0), |(s, w), (value, weight)| {
            (s + value * weight, w + weight)
        });
    (weights > 0.0).then(|| sum / weights)
}

/// Summarize the evaluations received by `subject`.
///
/// Only criteria with at least one evaluation appear. Items are ordered by
/// criterion name, then id.
pub fn summarize(
    subject: UserId,
    received: &[Evaluation],
    criteria: &[Criterion],
    weighting: Weighting,
) -> Vec<EvaluationSummaryItem> {
    summarize_with(subject, received, criteria, weighting, &HashMap::new())
}

/// Like [`summarize`], with each rater's contribution further multiplied by
/// their entry in `rater_weights`. Raters without an entry weigh 1.
pub fn summarize_with(
    subject: UserId,
    received: &[Evaluation],
    criteria: &[Criterion],
    weighting: Weighting,
    rater_weights: &HashMap<UserId, f64>,
) -> Vec<EvaluationSummaryItem> {
    let received: Vec<&Evaluation> = received
        .iter()
        .filter(|e| e.subject_id == subject)
        .collect();

    let familiarity = familiarity_by_rater(&received);
    let names: HashMap<CriterionId, &str> =
        criteria.iter().map(|c| (c.id, c.name.as_str())).collect();

    // criterion -> rater -> latest evaluation
    let mut grouped: BTreeMap<CriterionId, BTreeMap<UserId, &Evaluation>> = BTreeMap::new();
    for e in received.iter().copied() {
        let slot = grouped
            .entry(e.criterion_id)
            .or_default()
            .entry(e.rater_id)
            .or_insert(e);
        if e.updated_at > slot.updated_at {
            *slot = e;
        }
    }

    let mut items: Vec<EvaluationSummaryItem> = grouped
        .into_iter()
        .filter_map(|(criterion_id, by_rater)| {
            let Some(name) = names.get(&criterion_id) else {
                tracing::warn!(criterion_id, "evaluation references unknown criterion, skipping");
                return None;
            };
            let average = weighted_mean(by_rater.values().map(|e| {
                let weight = match weighting {
                    Weighting::Uniform => 1.0,
                    Weighting::Familiarity => familiarity
                        .get(&e.rater_id)
                        .map(|f| *f as f64)
                        .unwrap_or(1.0),
                };
                let rater = rater_weights.get(&e.rater_id).copied().unwrap_or(1.0);
                (e.score.get() as f64, weight * rater)
            }))?;
            Some(EvaluationSummaryItem {
                criterion_id,
                criterion_name: name.to_string(),
                average_score: average,
                count: by_rater.len(),
            })
        })
        .collect();

    items.sort_by(|a, b| {
        a.criterion_name
            .cmp(&b.criterion_name)
            .then(a.criterion_id.cmp(&b.criterion_id))
    });
    items
}

/// Summary of `subject` as seen by `viewer`, gated on how many ratings the
/// viewer has given. `viewer_given` holds the viewer's own evaluations.
///
/// A user looking at their own profile passes themself as both viewer and
/// subject.
#[allow(clippy::too_many_arguments)]
pub fn gated_summary(
    viewer: UserId,
    subject: UserId,
    received: &[Evaluation],
    viewer_given: &[Evaluation],
    criteria: &[Criterion],
    threshold: usize,
    weighting: Weighting,
    rater_weights: &HashMap<UserId, f64>,
) -> EvaluationSummary {
    let gating = GatingState::new(outbound_count(viewer, viewer_given), threshold);
    let criteria = if gating.eligible {
        summarize_with(subject, received, criteria, weighting, rater_weights)
    } else {
        Vec::new()
    };
    EvaluationSummary {
        subject_id: subject,
        criteria,
        gating,
    }
}

/// Per-rater familiarity with the subject, taken from the earliest
/// evaluation that recorded one.
fn familiarity_by_rater(received: &[&Evaluation]) -> HashMap<UserId, u8> {
    let mut earliest: HashMap<UserId, &Evaluation> = HashMap::new();
    for e in received.iter().copied().filter(|e| e.familiarity.is_some()) {
        let slot = earliest.entry(e.rater_id).or_insert(e);
        if (e.created_at, e.criterion_id) < (slot.created_at, slot.criterion_id) {
            *slot = e;
        }
    }
    earliest
        .into_iter()
        .filter_map(|(rater, e)| e.familiarity.map(|f| (rater, f.get())))
        .collect()
}
