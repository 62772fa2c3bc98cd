//! rapport-core: friend evaluation model, task queue and aggregation.
//!
//! This crate defines the data model, the storage trait and the pure
//! scoring logic that the rest of rapport builds on, plus the
//! [`service::EvaluationService`] that wires them to a store.

pub mod catalog;
pub mod error;
pub mod model;
pub mod rater_stats;
pub mod service;
pub mod submission;
pub mod summary;
pub mod tasks;
pub mod traits;

pub use error::{EvaluationError, Result};
pub use service::{EvaluationConfig, EvaluationService, TaskScope};
pub use traits::{EvaluationStore, Upserted};
