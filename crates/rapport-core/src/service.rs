//! Evaluation service.
//!
//! Ties the store to the task generator, submission handler and summary
//! aggregator. Every operation is a handful of store reads followed by a
//! pure computation; the only write is the evaluation upsert.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EvaluationError, Result};
use crate::model::{
    Criterion, EvaluationSummary, EvaluationSummaryItem, RaterStats, Submission,
    SubmissionReceipt, TaskPage, User, UserId,
};
use crate::rater_stats::{compute_rater_stats, rater_weights};
use crate::submission::{prepare_evaluation, validate_request};
use crate::summary::{gated_summary, summarize, Weighting};
use crate::tasks::build_task_page;
use crate::traits::EvaluationStore;

/// Which users a rater is asked to evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskScope {
    /// Every other registered user.
    #[default]
    Everyone,
    /// Only users with a confirmed friendship.
    ConfirmedFriends,
}

/// Tunables for the evaluation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Outbound ratings a user must give before seeing their own summary.
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// Tasks per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Weight each rater by their familiarity with the subject.
    #[serde(default = "default_true")]
    pub familiarity_weighting: bool,
    /// Also weight each rater by their reliability and extreme rate.
    #[serde(default)]
    pub rater_weighting: bool,
    #[serde(default)]
    pub task_scope: TaskScope,
}

fn default_threshold() -> usize {
    10
}
fn default_page_size() -> usize {
    20
}
fn default_true() -> bool {
    true
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            page_size: default_page_size(),
            familiarity_weighting: true,
            rater_weighting: false,
            task_scope: TaskScope::default(),
        }
    }
}

impl EvaluationConfig {
    fn weighting(&self) -> Weighting {
        if self.familiarity_weighting {
            Weighting::Familiarity
        } else {
            Weighting::Uniform
        }
    }
}

/// The evaluation flow over a shared store.
#[derive(Clone)]
pub struct EvaluationService {
    store: Arc<dyn EvaluationStore>,
    config: EvaluationConfig,
}

impl EvaluationService {
    pub fn new(store: Arc<dyn EvaluationStore>, config: EvaluationConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn EvaluationStore> {
        &self.store
    }

    /// The criterion catalog, ordered by id.
    pub async fn criteria(&self) -> Result<Vec<Criterion>> {
        self.store.list_criteria().await
    }

    /// One page of tasks for `rater`, starting at `offset`.
    pub async fn tasks(&self, rater: UserId, offset: usize) -> Result<TaskPage> {
        self.require_user(rater).await?;

        let subjects: Vec<User> = match self.config.task_scope {
            TaskScope::Everyone => self.store.list_users().await?,
            TaskScope::ConfirmedFriends => {
                let friends = self.store.confirmed_friends(rater).await?;
                let mut users = Vec::with_capacity(friends.len());
                for id in friends {
                    if let Some(user) = self.store.get_user(id).await? {
                        users.push(user);
                    }
                }
                users
            }
        };
        let criteria = self.store.list_criteria().await?;
        let given = self.store.evaluations_by_rater(rater).await?;

        let page = build_task_page(
            rater,
            &subjects,
            &criteria,
            &given,
            offset,
            self.config.page_size,
        );
        tracing::debug!(
            rater,
            offset,
            returned = page.tasks.len(),
            next = ?page.next_offset,
            "built task page"
        );
        Ok(page)
    }

    /// Record a score from `rater`, replacing any earlier score for the
    /// same subject and criterion.
    pub async fn submit(&self, rater: UserId, submission: Submission) -> Result<SubmissionReceipt> {
        let score = validate_request(rater, &submission)?;
        self.require_user(submission.subject_id).await?;
        if self
            .store
            .get_criterion(submission.criterion_id)
            .await?
            .is_none()
        {
            return Err(EvaluationError::NotFound {
                kind: "criterion",
                id: submission.criterion_id,
            });
        }

        let prior: Vec<_> = self
            .store
            .evaluations_by_rater(rater)
            .await?
            .into_iter()
            .filter(|e| e.subject_id == submission.subject_id)
            .collect();
        let prepared = prepare_evaluation(rater, &submission, score, &prior, chrono::Utc::now())?;
        let upserted = self.store.upsert_evaluation(prepared.evaluation).await?;

        tracing::info!(
            key = %upserted.evaluation.key(),
            score = upserted.evaluation.score.get(),
            replaced = upserted.replaced,
            first_time = prepared.first_time,
            "recorded evaluation"
        );

        Ok(SubmissionReceipt {
            evaluation_id: upserted.evaluation.id,
            created: !upserted.replaced,
            first_time: prepared.first_time,
        })
    }

    /// Gated, optionally weighted summary of `subject` as seen by `viewer`.
    /// The gate counts the viewer's outbound ratings.
    pub async fn summary(&self, viewer: UserId, subject: UserId) -> Result<EvaluationSummary> {
        self.require_user(subject).await?;
        let received = self.store.evaluations_for_subject(subject).await?;
        let given = self.store.evaluations_by_rater(viewer).await?;
        let criteria = self.store.list_criteria().await?;
        let weights = if self.config.rater_weighting {
            rater_weights(&self.all_rater_stats().await?)
        } else {
            HashMap::new()
        };

        Ok(gated_summary(
            viewer,
            subject,
            &received,
            &given,
            &criteria,
            self.config.threshold,
            self.config.weighting(),
            &weights,
        ))
    }

    /// Ungated, unweighted summary of `subject`.
    pub async fn legacy_summary(&self, subject: UserId) -> Result<Vec<EvaluationSummaryItem>> {
        self.require_user(subject).await?;
        let received = self.store.evaluations_for_subject(subject).await?;
        let criteria = self.store.list_criteria().await?;
        Ok(summarize(subject, &received, &criteria, Weighting::Uniform))
    }

    /// Statistics for every rater with at least one evaluation.
    pub async fn all_rater_stats(&self) -> Result<Vec<RaterStats>> {
        let evaluations = self.store.all_evaluations().await?;
        Ok(compute_rater_stats(&evaluations))
    }

    /// Statistics for one rater, `None` if they never rated anyone.
    pub async fn rater_stats(&self, user: UserId) -> Result<Option<RaterStats>> {
        self.require_user(user).await?;
        Ok(self
            .all_rater_stats()
            .await?
            .into_iter()
            .find(|s| s.user_id == user))
    }

    async fn require_user(&self, id: UserId) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or(EvaluationError::NotFound { kind: "user", id })
    }
}
