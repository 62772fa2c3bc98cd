//! Storage trait for evaluations and the reference data around them.
//!
//! Implemented by the `rapport-store` crate.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Criterion, CriterionId, Evaluation, Friendship, User, UserId};

/// Outcome of [`EvaluationStore::upsert_evaluation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    /// The evaluation as stored.
    pub evaluation: Evaluation,
    /// `true` if a prior evaluation for the same triple was overwritten.
    pub replaced: bool,
}

/// Persistence backend for users, criteria, friendships and evaluations.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    // -- users --------------------------------------------------------------

    /// All users, ordered by id.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Insert or rename a user.
    async fn upsert_user(&self, user: User) -> Result<()>;

    // -- criteria -----------------------------------------------------------

    /// All criteria, ordered by id.
    async fn list_criteria(&self) -> Result<Vec<Criterion>>;

    async fn get_criterion(&self, id: CriterionId) -> Result<Option<Criterion>>;

    /// The criterion named `name`, ignoring case and surrounding whitespace.
    async fn find_criterion_by_name(&self, name: &str) -> Result<Option<Criterion>>;

    /// Return the criterion with this name, creating it if needed.
    /// The boolean is `true` when a new criterion was created.
    async fn get_or_create_criterion(&self, name: &str) -> Result<(Criterion, bool)>;

    // -- friendships --------------------------------------------------------

    /// Record a friendship. Re-adding the same pair updates `confirmed`.
    async fn add_friendship(&self, friendship: Friendship) -> Result<()>;

    /// Ids of users with a confirmed friendship to `user`, in either
    /// direction, ordered by id.
    async fn confirmed_friends(&self, user: UserId) -> Result<Vec<UserId>>;

    // -- evaluations --------------------------------------------------------

    /// Evaluations given by `rater`.
    async fn evaluations_by_rater(&self, rater: UserId) -> Result<Vec<Evaluation>>;

    /// Evaluations received by `subject`.
    async fn evaluations_for_subject(&self, subject: UserId) -> Result<Vec<Evaluation>>;

    /// Every stored evaluation.
    async fn all_evaluations(&self) -> Result<Vec<Evaluation>>;

    /// Store `evaluation`, replacing any evaluation with the same
    /// (rater, subject, criterion) triple. On replace the stored `id` and
    /// `created_at` are kept; everything else is taken from `evaluation`.
    async fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<Upserted>;
}
