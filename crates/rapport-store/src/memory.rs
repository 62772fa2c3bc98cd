//! In-memory store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rapport_core::error::{EvaluationError, Result};
use rapport_core::model::{
    Criterion, CriterionId, Evaluation, EvaluationKey, Friendship, User, UserId,
};
use rapport_core::traits::{EvaluationStore, Upserted};

/// Serializable copy of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub friendships: Vec<Friendship>,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    criteria: BTreeMap<CriterionId, Criterion>,
    friendships: Vec<Friendship>,
    evaluations: BTreeMap<EvaluationKey, Evaluation>,
}

impl From<Snapshot> for Tables {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            criteria: snapshot.criteria.into_iter().map(|c| (c.id, c)).collect(),
            friendships: snapshot.friendships,
            evaluations: snapshot
                .evaluations
                .into_iter()
                .map(|e| (e.key(), e))
                .collect(),
        }
    }
}

/// A store that keeps everything in process memory.
///
/// See [`JsonFileStore`](crate::JsonFileStore) for a persistent variant.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot. Later evaluations for the same
    /// triple win.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tables: RwLock::new(Tables::from(snapshot)),
        }
    }

    /// Replace the whole contents with `snapshot`.
    pub fn restore(&self, snapshot: Snapshot) -> Result<()> {
        *self.write()? = Tables::from(snapshot);
        Ok(())
    }

    /// Copy the current contents out.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let t = self.read()?;
        Ok(Snapshot {
            users: t.users.values().cloned().collect(),
            criteria: t.criteria.values().cloned().collect(),
            friendships: t.friendships.clone(),
            evaluations: t.evaluations.values().cloned().collect(),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| EvaluationError::storage("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| EvaluationError::storage("memory store lock poisoned"))
    }
}

fn criterion_named<'a>(t: &'a Tables, name: &str) -> Option<&'a Criterion> {
    t.criteria.values().find(|c| c.is_named(name))
}

fn same_pair(a: &Friendship, b: &Friendship) -> bool {
    (a.from_user == b.from_user && a.to_user == b.to_user)
        || (a.from_user == b.to_user && a.to_user == b.from_user)
}

#[async_trait]
impl EvaluationStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: User) -> Result<()> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    async fn list_criteria(&self) -> Result<Vec<Criterion>> {
        Ok(self.read()?.criteria.values().cloned().collect())
    }

    async fn get_criterion(&self, id: CriterionId) -> Result<Option<Criterion>> {
        Ok(self.read()?.criteria.get(&id).cloned())
    }

    async fn find_criterion_by_name(&self, name: &str) -> Result<Option<Criterion>> {
        Ok(criterion_named(&*self.read()?, name).cloned())
    }

    async fn get_or_create_criterion(&self, name: &str) -> Result<(Criterion, bool)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EvaluationError::validation("name", "criterion name is empty"));
        }

        let mut t = self.write()?;
        if let Some(existing) = criterion_named(&t, name) {
            return Ok((existing.clone(), false));
        }

        let id = t.criteria.keys().next_back().map_or(1, |last| last + 1);
        let criterion = Criterion {
            id,
            name: name.to_string(),
        };
        t.criteria.insert(id, criterion.clone());
        Ok((criterion, true))
    }

    async fn add_friendship(&self, friendship: Friendship) -> Result<()> {
        let mut t = self.write()?;
        match t.friendships.iter().position(|f| same_pair(f, &friendship)) {
            Some(i) => t.friendships[i].confirmed = friendship.confirmed,
            None => t.friendships.push(friendship),
        }
        Ok(())
    }

    async fn confirmed_friends(&self, user: UserId) -> Result<Vec<UserId>> {
        let t = self.read()?;
        let friends: BTreeSet<UserId> = t
            .friendships
            .iter()
            .filter(|f| f.confirmed)
            .filter_map(|f| f.other(user))
            .filter(|&other| other != user)
            .collect();
        Ok(friends.into_iter().collect())
    }

    async fn evaluations_by_rater(&self, rater: UserId) -> Result<Vec<Evaluation>> {
        Ok(self
            .read()?
            .evaluations
            .values()
            .filter(|e| e.rater_id == rater)
            .cloned()
            .collect())
    }

    async fn evaluations_for_subject(&self, subject: UserId) -> Result<Vec<Evaluation>> {
        Ok(self
            .read()?
            .evaluations
            .values()
            .filter(|e| e.subject_id == subject)
            .cloned()
            .collect())
    }

    async fn all_evaluations(&self) -> Result<Vec<Evaluation>> {
        Ok(self.read()?.evaluations.values().cloned().collect())
    }

    async fn upsert_evaluation(&self, mut evaluation: Evaluation) -> Result<Upserted> {
        let mut t = self.write()?;
        let key = evaluation.key();
        let replaced = match t.evaluations.get(&key) {
            Some(prior) => {
                evaluation.id = prior.id;
                evaluation.created_at = prior.created_at;
                true
            }
            None => false,
        };
        t.evaluations.insert(key, evaluation.clone());
        Ok(Upserted {
            evaluation,
            replaced,
        })
    }
}
