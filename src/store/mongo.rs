//! MongoDB player store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use serde_json::Value;
use tracing::{debug, info};

use super::{Condition, PlayerQuery, PlayerStore, StoreError};
use crate::config::DatabaseConfig;
use crate::models::{PlayerDocument, NAME_FIELD};

/// Player store backed by one MongoDB collection.
pub struct MongoPlayerStore {
    client: Client,
    database: String,
    collection: Collection<Document>,
}

impl MongoPlayerStore {
    /// Connect and ping. Fails if the server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 }).await?;

        info!(
            "Connected to MongoDB database '{}', collection '{}'",
            config.database, config.collection
        );

        Ok(Self {
            collection: db.collection(&config.collection),
            database: config.database.clone(),
            client,
        })
    }
}

#[async_trait]
impl PlayerStore for MongoPlayerStore {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn find(&self, query: &PlayerQuery) -> Result<Vec<PlayerDocument>, StoreError> {
        let filter = build_filter(&query.conditions);
        debug!("MongoDB find: {}", filter);

        let mut find = self.collection.find(filter);
        if let Some(projection) = build_projection(&query.projection) {
            find = find.projection(projection);
        }
        if let Some(field) = query.sort_desc {
            find = find.sort(doc! { field: -1 });
        }
        if let Some(limit) = query.limit {
            find = find.limit(i64::from(limit));
        }

        let docs: Vec<Document> = find.await?.try_collect().await?;
        docs.into_iter().map(to_player_document).collect()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<PlayerDocument>, StoreError> {
        self.collection
            .find_one(doc! { NAME_FIELD: name })
            .await?
            .map(to_player_document)
            .transpose()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

fn condition_ops(condition: &Condition) -> (&'static str, Document) {
    match condition {
        Condition::Exists(f) => (*f, doc! { "$exists": true, "$ne": Bson::Null }),
        Condition::GreaterThan(f, bound) => (*f, doc! { "$gt": *bound }),
        Condition::OneOf(f, values) => (*f, doc! { "$in": values.clone() }),
        Condition::Matches(f, pattern) => (*f, doc! { "$regex": pattern.as_str(), "$options": "i" }),
    }
}

/// Conditions on the same field share one operator document.
pub(crate) fn build_filter(conditions: &[Condition]) -> Document {
    let mut grouped: Vec<(&str, Document)> = Vec::new();

    for condition in conditions {
        let (field, ops) = condition_ops(condition);
        match grouped.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => {
                for (op, value) in ops {
                    existing.insert(op, value);
                }
            }
            None => grouped.push((field, ops)),
        }
    }

    grouped
        .into_iter()
        .map(|(field, ops)| (field.to_string(), Bson::Document(ops)))
        .collect()
}

pub(crate) fn build_projection(fields: &[&str]) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }
    let mut projection: Document = fields.iter().map(|f| (f.to_string(), Bson::Int32(1))).collect();
    projection.insert("_id", 0);
    Some(projection)
}

/// Convert a BSON document to plain JSON the way a JSON API client expects it:
/// `ObjectId`s as hex strings, integral doubles as integers.
pub(crate) fn to_player_document(doc: Document) -> Result<PlayerDocument, StoreError> {
    match normalize(Bson::Document(doc)).into_relaxed_extjson() {
        Value::Object(map) => Ok(PlayerDocument::new(map)),
        other => Err(StoreError::InvalidDocument(format!(
            "expected object, got {}",
            other
        ))),
    }
}

fn normalize(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Double(d) if d.fract() == 0.0 && d.abs() < 9.0e15 => Bson::Int64(d as i64),
        Bson::Document(doc) => Bson::Document(doc.into_iter().map(|(k, v)| (k, normalize(v))).collect()),
        Bson::Array(items) => Bson::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}
