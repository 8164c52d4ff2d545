//! Player document store.
//!
//! Handlers describe what they want as a [`PlayerQuery`] and run it through
//! a [`PlayerStore`]:
//! - `mongo`: MongoDB collection (production)
//! - `memory`: in-process documents, optionally loaded from a JSONL snapshot
//!
//! The store is read-only from this service's point of view.

pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::models::PlayerDocument;

pub use memory::MemoryPlayerStore;
pub use mongo::MongoPlayerStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// A single filter condition on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field is present and not null.
    Exists(&'static str),
    /// Field is numeric and strictly greater than the bound.
    GreaterThan(&'static str, i64),
    /// Field is a string equal to one of the values.
    OneOf(&'static str, Vec<String>),
    /// Case-insensitive pattern match anywhere in a string field.
    /// The pattern is used as given, so `.` and `*` keep their pattern meaning.
    Matches(&'static str, String),
}

/// Filter, projection, sort and limit for a `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerQuery {
    pub conditions: Vec<Condition>,
    pub projection: Vec<&'static str>,
    pub sort_desc: Option<&'static str>,
    pub limit: Option<u32>,
}

impl PlayerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(mut self, field: &'static str) -> Self {
        self.conditions.push(Condition::Exists(field));
        self
    }

    pub fn greater_than(mut self, field: &'static str, bound: i64) -> Self {
        self.conditions.push(Condition::GreaterThan(field, bound));
        self
    }

    pub fn one_of<I, S>(mut self, field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.push(Condition::OneOf(
            field,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn matches(mut self, field: &'static str, pattern: impl Into<String>) -> Self {
        self.conditions.push(Condition::Matches(field, pattern.into()));
        self
    }

    pub fn project(mut self, fields: &[&'static str]) -> Self {
        self.projection = fields.to_vec();
        self
    }

    pub fn sort_desc(mut self, field: &'static str) -> Self {
        self.sort_desc = Some(field);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Trait for player document stores.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Store name for logging.
    fn name(&self) -> &'static str;

    /// Run a filtered, projected, sorted and limited query.
    async fn find(&self, query: &PlayerQuery) -> Result<Vec<PlayerDocument>, StoreError>;

    /// First document whose `strPlayer` equals `name` exactly.
    async fn find_by_name(&self, name: &str) -> Result<Option<PlayerDocument>, StoreError>;

    /// Check that the store answers.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Readiness slot for the shared store.
///
/// Starts empty and is filled once, when the startup connection completes.
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct StoreHandle {
    slot: Arc<OnceCell<Arc<dyn PlayerStore>>>,
}

impl StoreHandle {
    /// A handle with no store yet.
    pub fn pending() -> Self {
        Self::default()
    }

    /// A handle that is ready immediately.
    pub fn ready(store: Arc<dyn PlayerStore>) -> Self {
        Self {
            slot: Arc::new(OnceCell::new_with(Some(store))),
        }
    }

    /// Install the store. Returns false if one was already installed.
    pub fn install(&self, store: Arc<dyn PlayerStore>) -> bool {
        self.slot.set(store).is_ok()
    }

    /// The store, or `None` while the connection is still pending.
    pub fn get(&self) -> Option<Arc<dyn PlayerStore>> {
        self.slot.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.initialized()
    }
}
