//! Storage backends and configuration for rapport.
//!
//! Provides an in-memory store, a JSON-file-backed store, and the config
//! layer that picks between them.

pub mod config;
pub mod json;
pub mod memory;

pub use config::{
    load_config, load_config_from, open_store, RapportConfig, ServerConfig, StoreConfig,
};
pub use json::JsonFileStore;
pub use memory::{MemoryStore, Snapshot};
