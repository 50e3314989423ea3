//! Document-store seam.
//!
//! Services talk to the hosted document database only through
//! [`DocumentStore`]: point reads, filtered queries over one collection, and
//! atomic multi-document write batches with server-assigned timestamps.

mod memory;
mod query;
mod redis_store;

pub use memory::{InjectedFailure, MemoryStore};
pub use query::{Direction, FieldRef, Filter, FilterOp, IN_FILTER_LIMIT, Query, compare_values, id_chunks};
pub use redis_store::RedisStore;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    errors::StoreError,
    keys::{CollectionPath, DocPath},
};

/// A stored document: its id, full path and raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub path: DocPath,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(path: DocPath, fields: Map<String, Value>) -> Self {
        Self {
            id: path.id().to_string(),
            path,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Decodes the fields into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Field values for a write, plus the fields the store stamps at commit time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: Map<String, Value>,
    server_timestamps: Vec<String>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record carrying only a server-assigned `createdAt`.
    pub fn created_now() -> Self {
        Self::new().server_timestamp("createdAt")
    }

    /// Builds fields from any serializable struct that encodes to an object.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(values) => Ok(Self {
                values,
                server_timestamps: Vec::new(),
            }),
            other => Err(StoreError::InvalidArgument {
                message: format!("record must encode to an object, got {other}"),
            }),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn server_timestamp(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.values.remove(&key);
        self.server_timestamps.push(key);
        self
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Materializes the fields with `timestamp` in every server-stamped slot.
    pub fn resolve(self, timestamp: &str) -> Map<String, Value> {
        let mut values = self.values;
        for key in self.server_timestamps {
            values.insert(key, Value::String(timestamp.to_string()));
        }
        values
    }
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Replace the document with these fields.
    Set { path: DocPath, fields: Fields },
    /// Merge fields into the document, creating it when missing.
    Merge { path: DocPath, fields: Fields },
    /// Merge fields into an existing document; fails the batch when missing.
    Update { path: DocPath, fields: Fields },
    /// Remove the document; missing documents are ignored.
    Delete { path: DocPath },
}

impl Write {
    pub fn path(&self) -> &DocPath {
        match self {
            Write::Set { path, .. } | Write::Merge { path, .. } | Write::Update { path, .. } | Write::Delete { path } => {
                path
            }
        }
    }
}

/// Ordered group of writes applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: DocPath, fields: Fields) -> &mut Self {
        self.writes.push(Write::Set { path, fields });
        self
    }

    pub fn merge(&mut self, path: DocPath, fields: Fields) -> &mut Self {
        self.writes.push(Write::Merge { path, fields });
        self
    }

    pub fn update(&mut self, path: DocPath, fields: Fields) -> &mut Self {
        self.writes.push(Write::Update { path, fields });
        self
    }

    pub fn delete(&mut self, path: DocPath) -> &mut Self {
        self.writes.push(Write::Delete { path });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Backend contract consumed by every service.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Point read; `None` when the document does not exist.
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Filtered, ordered, limited read over one collection.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Applies every write in the batch atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    async fn exists(&self, path: &DocPath) -> Result<bool, StoreError> {
        Ok(self.get(path).await?.is_some())
    }

    /// Counts a collection by reading all of it.
    async fn count(&self, collection: &CollectionPath) -> Result<usize, StoreError> {
        Ok(self.query(&Query::collection(collection.clone())).await?.len())
    }

    async fn set(&self, path: DocPath, fields: Fields) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.set(path, fields);
        self.commit(batch).await
    }

    async fn delete(&self, path: DocPath) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.delete(path);
        self.commit(batch).await
    }
}

/// Canonical stored form of a timestamp: fixed-width RFC 3339 in UTC, so
/// string order equals chronological order.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
