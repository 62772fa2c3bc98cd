//! Submission validation and upsert planning.
//!
//! A submission is checked in two steps around the store lookups done by
//! the service: first the request itself (score range, self-evaluation),
//! then, once the subject and criterion are known to exist, the
//! familiarity rule against the rater's prior evaluations of the subject.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EvaluationError, Result};
use crate::model::{Evaluation, Familiarity, Score, Submission, UserId};

/// An evaluation ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEvaluation {
    pub evaluation: Evaluation,
    /// The rater had never evaluated this subject before.
    pub first_time: bool,
}

/// Check the parts of a submission that need no stored state.
pub fn validate_request(rater: UserId, submission: &Submission) -> Result<Score> {
    let score = Score::try_from(submission.score)?;
    if rater == submission.subject_id {
        return Err(EvaluationError::InvalidSubject);
    }
    Ok(score)
}

/// Build the evaluation to store.
///
/// `prior` holds the rater's existing evaluations of the subject (any
/// criterion). Familiarity is required iff `prior` is empty. Afterwards a
/// supplied familiarity is ignored and the one already recorded on the
/// same triple, if any, is carried over.
pub fn prepare_evaluation(
    rater: UserId,
    submission: &Submission,
    score: Score,
    prior: &[Evaluation],
    now: DateTime<Utc>,
) -> Result<PreparedEvaluation> {
    let prior: Vec<&Evaluation> = prior
        .iter()
        .filter(|e| e.rater_id == rater && e.subject_id == submission.subject_id)
        .collect();
    let first_time = prior.is_empty();

    let familiarity = if first_time {
        let raw = submission.familiarity.ok_or_else(|| {
            EvaluationError::validation(
                "familiarity",
                "required on the first evaluation of a user",
            )
        })?;
        Some(Familiarity::try_from(raw)?)
    } else {
        if submission.familiarity.is_some() {
            tracing::debug!(
                rater,
                subject = submission.subject_id,
                "ignoring familiarity on repeat evaluation"
            );
        }
        prior
            .iter()
            .find(|e| e.criterion_id == submission.criterion_id)
            .and_then(|e| e.familiarity)
    };

    Ok(PreparedEvaluation {
        evaluation: Evaluation {
            id: Uuid::new_v4(),
            rater_id: rater,
            subject_id: submission.subject_id,
            criterion_id: submission.criterion_id,
            score,
            familiarity,
            created_at: now,
            updated_at: now,
        },
        first_time,
    })
}
