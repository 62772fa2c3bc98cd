//! JSON snapshot store.
//!
//! Serves reads from an in-memory copy and rewrites the whole snapshot file
//! after every mutation. A mutation whose write fails is rolled back in
//! memory as well.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use rapport_core::error::{EvaluationError, Result};
use rapport_core::model::{Criterion, CriterionId, Evaluation, Friendship, User, UserId};
use rapport_core::traits::{EvaluationStore, Upserted};

use crate::memory::{MemoryStore, Snapshot};

/// A [`MemoryStore`] persisted to a JSON file.
pub struct JsonFileStore {
    inner: MemoryStore,
    path: PathBuf,
    /// Serializes mutate-then-persist sequences.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file yields an empty store; the
    /// file is created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<Snapshot>(&content).map_err(|e| {
                EvaluationError::storage(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "store file not found, starting empty");
                Snapshot::default()
            }
            Err(e) => {
                return Err(EvaluationError::storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        tracing::debug!(
            path = %path.display(),
            users = snapshot.users.len(),
            evaluations = snapshot.evaluations.len(),
            "opened json store"
        );

        Ok(Self {
            inner: MemoryStore::from_snapshot(snapshot),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk via a temp file and rename.
    async fn persist(&self) -> Result<()> {
        let snapshot = self.inner.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot).map_err(EvaluationError::storage)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create", parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error("replace", &self.path, e))?;
        Ok(())
    }

    /// Persist the current contents, restoring `before` in memory if the
    /// write fails. Callers hold `write_lock`.
    async fn commit(&self, before: Snapshot) -> Result<()> {
        if let Err(e) = self.persist().await {
            tracing::warn!(path = %self.path.display(), error = %e, "write failed, rolling back");
            self.inner.restore(before)?;
            return Err(e);
        }
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> EvaluationError {
    EvaluationError::storage(format!("failed to {action} {}: {err}", path.display()))
}

#[async_trait]
impl EvaluationStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.inner.list_users().await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn upsert_user(&self, user: User) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot()?;
        self.inner.upsert_user(user).await?;
        self.commit(before).await
    }

    async fn list_criteria(&self) -> Result<Vec<Criterion>> {
        self.inner.list_criteria().await
    }

    async fn get_criterion(&self, id: CriterionId) -> Result<Option<Criterion>> {
        self.inner.get_criterion(id).await
    }

    async fn find_criterion_by_name(&self, name: &str) -> Result<Option<Criterion>> {
        self.inner.find_criterion_by_name(name).await
    }

    async fn get_or_create_criterion(&self, name: &str) -> Result<(Criterion, bool)> {
        if let Some(existing) = self.inner.find_criterion_by_name(name).await? {
            return Ok((existing, false));
        }

        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot()?;
        let (criterion, created) = self.inner.get_or_create_criterion(name).await?;
        if created {
            self.commit(before).await?;
        }
        Ok((criterion, created))
    }

    async fn add_friendship(&self, friendship: Friendship) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot()?;
        self.inner.add_friendship(friendship).await?;
        self.commit(before).await
    }

    async fn confirmed_friends(&self, user: UserId) -> Result<Vec<UserId>> {
        self.inner.confirmed_friends(user).await
    }

    async fn evaluations_by_rater(&self, rater: UserId) -> Result<Vec<Evaluation>> {
        self.inner.evaluations_by_rater(rater).await
    }

    async fn evaluations_for_subject(&self, subject: UserId) -> Result<Vec<Evaluation>> {
        self.inner.evaluations_for_subject(subject).await
    }

    async fn all_evaluations(&self) -> Result<Vec<Evaluation>> {
        self.inner.all_evaluations().await
    }

    async fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<Upserted> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot()?;
        let upserted = self.inner.upsert_evaluation(evaluation).await?;
        self.commit(before).await?;
        Ok(upserted)
    }
}
