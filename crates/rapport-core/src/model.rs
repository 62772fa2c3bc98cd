//! Core data model types for rapport.
//!
//! Users rate each other ("evaluate") on named criteria. These are the
//! types every other module works with: persisted evaluations, the
//! ephemeral tasks offered to a rater, and the derived summaries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EvaluationError, Result};

/// Identifier of a user (rater or subject).
pub type UserId = u64;

/// Identifier of a criterion.
pub type CriterionId = u64;

/// Lowest accepted score or familiarity value.
pub const RATING_MIN: u8 = 1;
/// Highest accepted score or familiarity value.
pub const RATING_MAX: u8 = 10;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A named trait users are rated on (e.g. "Humor").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub name: String,
}

impl Criterion {
    /// Key under which criterion names are unique: trimmed and lowercased.
    pub fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Whether `name` refers to this criterion.
    pub fn is_named(&self, name: &str) -> bool {
        Self::name_key(&self.name) == Self::name_key(name)
    }
}

/// A friendship request between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub from_user: UserId,
    pub to_user: UserId,
    #[serde(default)]
    pub confirmed: bool,
}

impl Friendship {
    /// The other side of the friendship, if `user` is part of it.
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if self.from_user == user {
            Some(self.to_user)
        } else if self.to_user == user {
            Some(self.from_user)
        } else {
            None
        }
    }
}

fn check_rating(field: &str, value: i64) -> Result<u8> {
    if (RATING_MIN as i64..=RATING_MAX as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(EvaluationError::validation(
            field,
            format!("must be between {RATING_MIN} and {RATING_MAX}, got {value}"),
        ))
    }
}

/// A score in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Score(u8);

impl Score {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = EvaluationError;

    fn try_from(value: i64) -> Result<Self> {
        check_rating("score", value).map(Score)
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        score.0 as i64
    }
}

/// How well a rater knows a subject, in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Familiarity(u8);

impl Familiarity {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Familiarity {
    type Error = EvaluationError;

    fn try_from(value: i64) -> Result<Self> {
        check_rating("familiarity", value).map(Familiarity)
    }
}

impl From<Familiarity> for i64 {
    fn from(familiarity: Familiarity) -> Self {
        familiarity.0 as i64
    }
}

/// A persisted rating. At most one exists per (rater, subject, criterion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub rater_id: UserId,
    pub subject_id: UserId,
    pub criterion_id: CriterionId,
    pub score: Score,
    /// Recorded on the rater's first evaluation of the subject.
    #[serde(default)]
    pub familiarity: Option<Familiarity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    /// The uniqueness key of an evaluation.
    pub fn key(&self) -> EvaluationKey {
        EvaluationKey {
            rater_id: self.rater_id,
            subject_id: self.subject_id,
            criterion_id: self.criterion_id,
        }
    }
}

/// (rater, subject, criterion) triple identifying an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EvaluationKey {
    pub rater_id: UserId,
    pub subject_id: UserId,
    pub criterion_id: CriterionId,
}

impl fmt::Display for EvaluationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}#{}",
            self.rater_id, self.subject_id, self.criterion_id
        )
    }
}

/// A proposed, not yet submitted rating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTask {
    pub subject_id: UserId,
    pub subject_name: String,
    pub criterion_id: CriterionId,
    pub criterion_name: String,
    /// The client must collect a familiarity value alongside the score.
    pub first_time: bool,
}

/// One page of the evaluation task queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPage {
    pub tasks: Vec<EvaluationTask>,
    /// Offset of the next page, `None` once the candidates are exhausted.
    pub next_offset: Option<usize>,
}

/// A raw, unvalidated submission from a rater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub subject_id: UserId,
    pub criterion_id: CriterionId,
    pub score: i64,
    #[serde(default)]
    pub familiarity: Option<i64>,
}

/// Confirmation returned for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub evaluation_id: Uuid,
    /// `false` when an earlier score for the same triple was replaced.
    pub created: bool,
    /// Whether this was the rater's first evaluation of the subject.
    pub first_time: bool,
}

/// Mean score of one subject on one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummaryItem {
    pub criterion_id: CriterionId,
    pub criterion_name: String,
    pub average_score: f64,
    /// Number of distinct raters contributing.
    pub count: usize,
}

/// Whether a subject may see their own summary yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingState {
    pub eligible: bool,
    pub threshold: usize,
    pub outbound_count: usize,
}

impl GatingState {
    pub fn new(outbound_count: usize, threshold: usize) -> Self {
        Self {
            eligible: outbound_count >= threshold,
            threshold,
            outbound_count,
        }
    }

    /// How many more ratings the subject has to give before unlocking.
    pub fn remaining(&self) -> usize {
        self.threshold.saturating_sub(self.outbound_count)
    }
}

/// Gated summary of a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub subject_id: UserId,
    /// Empty while `gating.eligible` is false.
    pub criteria: Vec<EvaluationSummaryItem>,
    pub gating: GatingState,
}

/// Behavioural statistics of a rater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterStats {
    pub user_id: UserId,
    pub ratings_count: usize,
    pub mean_score: f64,
    pub std_score: f64,
    /// Share of scores at either end of the scale.
    pub extreme_rate: f64,
    /// How closely the rater agrees with consensus, in `0.5..=1.0`.
    pub reliability: f64,
}
