//! Evaluation task queue.
//!
//! Builds the ordered set of (subject, criterion) pairs a rater has not
//! scored yet and cuts it into offset-addressed pages. Ordering is by
//! subject id, then criterion id, so the same stored state always yields
//! the same page for a given offset.

use std::collections::HashSet;

use crate::model::{Criterion, Evaluation, EvaluationTask, TaskPage, User, UserId};

/// Compute one page of tasks for `rater`.
///
/// `subjects` is the candidate subject pool (the rater is skipped if
/// present), `given` the evaluations the rater has already submitted.
pub fn build_task_page(
    rater: UserId,
    subjects: &[User],
    criteria: &[Criterion],
    given: &[Evaluation],
    offset: usize,
    page_size: usize,
) -> TaskPage {
    let candidates = candidates(rater, subjects, criteria, given);
    let page_size = page_size.max(1);

    if offset >= candidates.len() {
        return TaskPage {
            tasks: Vec::new(),
            next_offset: None,
        };
    }

    let end = (offset + page_size).min(candidates.len());
    let tasks = candidates[offset..end].to_vec();
    let next_offset = (end < candidates.len()).then_some(end);

    TaskPage { tasks, next_offset }
}

/// The full ordered candidate list for `rater`.
pub fn candidates(
    rater: UserId,
    subjects: &[User],
    criteria: &[Criterion],
    given: &[Evaluation],
) -> Vec<EvaluationTask> {
    let mut subjects: Vec<&User> = subjects.iter().filter(|u| u.id != rater).collect();
    subjects.sort_by_key(|u| u.id);
    subjects.dedup_by_key(|u| u.id);

    let mut criteria: Vec<&Criterion> = criteria.iter().collect();
    criteria.sort_by_key(|c| c.id);

    let rated_pairs: HashSet<_> = given
        .iter()
        .filter(|e| e.rater_id == rater)
        .map(|e| (e.subject_id, e.criterion_id))
        .collect();
    let known_subjects: HashSet<UserId> = rated_pairs.iter().map(|(s, _)| *s).collect();

    let mut tasks = Vec::new();
    for subject in subjects {
        // Only the first queued task for a never-rated subject asks for
        // familiarity.
        let mut first_time = !known_subjects.contains(&subject.id);
        for criterion in &criteria {
            if rated_pairs.contains(&(subject.id, criterion.id)) {
                continue;
            }
            tasks.push(EvaluationTask {
                subject_id: subject.id,
                subject_name: subject.username.clone(),
                criterion_id: criterion.id,
                criterion_name: criterion.name.clone(),
                first_time,
            });
            first_time = false;
        }
    }

    tasks
}
