//! In-memory player store.
//!
//! Evaluates [`PlayerQuery`] with the same semantics the MongoDB store
//! gets from the server. Documents can be loaded from a JSON Lines snapshot,
//! one player object per line.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Condition, PlayerQuery, PlayerStore, StoreError};
use crate::models::PlayerDocument;

/// Player store backed by a vector of documents, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlayerStore {
    documents: Vec<PlayerDocument>,
}

impl MemoryPlayerStore {
    pub fn new(documents: Vec<PlayerDocument>) -> Self {
        Self { documents }
    }

    /// Load a JSONL snapshot. Blank lines are skipped; a malformed line is skipped with a warning.
    pub fn from_jsonl(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut documents = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(map)) => documents.push(PlayerDocument::new(map)),
                Ok(_) => warn!("Skipping non-object at line {} of {:?}", line_num + 1, path),
                Err(e) => warn!("Failed to parse line {} of {:?}: {}", line_num + 1, path, e),
            }
        }

        info!("Loaded {} player documents from {:?}", documents.len(), path);
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// A condition with its pattern compiled.
enum Compiled<'a> {
    Exists(&'a str),
    GreaterThan(&'a str, i64),
    OneOf(&'a str, &'a [String]),
    Matches(&'a str, Regex),
}

impl<'a> Compiled<'a> {
    fn compile(condition: &'a Condition) -> Result<Self, StoreError> {
        Ok(match condition {
            Condition::Exists(f) => Compiled::Exists(f),
            Condition::GreaterThan(f, bound) => Compiled::GreaterThan(f, *bound),
            Condition::OneOf(f, values) => Compiled::OneOf(f, values),
            Condition::Matches(f, pattern) => Compiled::Matches(
                f,
                RegexBuilder::new(pattern).case_insensitive(true).build()?,
            ),
        })
    }

    fn accepts(&self, doc: &PlayerDocument) -> bool {
        match self {
            Compiled::Exists(f) => doc.has(f),
            Compiled::GreaterThan(f, bound) => doc
                .get(f)
                .and_then(Value::as_f64)
                .is_some_and(|v| v > *bound as f64),
            Compiled::OneOf(f, values) => doc
                .get(f)
                .and_then(Value::as_str)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
            Compiled::Matches(f, re) => doc
                .get(f)
                .and_then(Value::as_str)
                .is_some_and(|v| re.is_match(v)),
        }
    }
}

/// Descending numeric order; non-numeric values sort last.
fn cmp_desc(a: &PlayerDocument, b: &PlayerDocument, field: &str) -> Ordering {
    let av = a.get(field).and_then(Value::as_f64);
    let bv = b.get(field).and_then(Value::as_f64);
    match (av, bv) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl PlayerStore for MemoryPlayerStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, query: &PlayerQuery) -> Result<Vec<PlayerDocument>, StoreError> {
        let conditions = query
            .conditions
            .iter()
            .map(Compiled::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let mut matched: Vec<&PlayerDocument> = self
            .documents
            .iter()
            .filter(|doc| conditions.iter().all(|c| c.accepts(doc)))
            .collect();

        if let Some(field) = query.sort_desc {
            matched.sort_by(|a, b| cmp_desc(a, b, field));
        }

        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        let results: Vec<PlayerDocument> = matched
            .into_iter()
            .take(limit)
            .map(|doc| {
                if query.projection.is_empty() {
                    doc.clone()
                } else {
                    doc.clone().project(&query.projection)
                }
            })
            .collect();

        debug!("Memory query matched {} documents", results.len());
        Ok(results)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<PlayerDocument>, StoreError> {
        Ok(self
            .documents
            .iter()
            .find(|doc| doc.name() == Some(name))
            .cloned())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
